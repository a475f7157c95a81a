// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cluster compatibility versions.

use std::fmt::Display;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A cluster compatibility version. Supports conversion from a string
/// formatted as "MAJOR.MINOR", e.g. "4.2".
///
/// Versions are totally ordered: a feature available at some version is
/// expected to be available at every later one, which is what the feature
/// matrix relies on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Version {
    major: u16,
    minor: u16,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("expected 2 fields in version {0:?}, got {1}")]
    FieldCount(String, usize),

    #[error("failed to parse version {0:?}: {1}")]
    Field(String, std::num::ParseIntError),
}

impl Version {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    #[inline]
    pub fn major(&self) -> u16 {
        self.major
    }

    #[inline]
    pub fn minor(&self) -> u16 {
        self.minor
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s
            .split('.')
            .map(|f| {
                u16::from_str(f)
                    .map_err(|e| VersionParseError::Field(s.to_owned(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match fields.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor)),
            _ => Err(VersionParseError::FieldCount(s.to_owned(), fields.len())),
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'d> Deserialize<'d> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'d>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

impl JsonSchema for Version {
    fn schema_name() -> String {
        "Version".to_owned()
    }

    fn json_schema(
        gen: &mut schemars::gen::SchemaGenerator,
    ) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

#[cfg(test)]
mod test {
    use super::Version;
    use serde::Deserialize;
    use serde_test::{assert_tokens, Token};
    use std::str::FromStr;

    const TEST_CASES: &[(&str, Result<Version, ()>)] = &[
        ("4.2", Ok(Version { major: 4, minor: 2 })),
        ("3.10", Ok(Version { major: 3, minor: 10 })),
        ("0.0", Ok(Version { major: 0, minor: 0 })),
        ("4", Err(())),
        ("4.2.1", Err(())),
        ("4.x", Err(())),
        ("-1.0", Err(())),
        ("70000.0", Err(())),
        ("", Err(())),
    ];

    #[test]
    fn version_from_str() {
        for (input, expected) in TEST_CASES {
            match Version::from_str(input) {
                Ok(v) => assert_eq!(v, expected.unwrap()),
                Err(_) => assert!(
                    expected.is_err(),
                    "Expected error parsing version {}",
                    input
                ),
            }
        }
    }

    #[test]
    fn version_serialization() {
        for (input, expected) in TEST_CASES {
            match expected {
                Ok(v) => assert_tokens(v, &[Token::Str(input)]),
                Err(_) => {
                    let tokens = [Token::Str(input)];
                    let mut de = serde_test::Deserializer::new(&tokens);
                    assert!(Version::deserialize(&mut de).is_err());
                }
            }
        }
    }

    #[test]
    fn versions_order_numerically() {
        let v3_9 = Version::new(3, 9);
        let v3_10 = Version::new(3, 10);
        let v4_0 = Version::new(4, 0);
        assert!(v3_9 < v3_10);
        assert!(v3_10 < v4_0);
        assert_eq!(v3_10.to_string(), "3.10");
    }
}
