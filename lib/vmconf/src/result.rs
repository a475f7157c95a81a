// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The outcome of a single check and of a whole operation.

use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vmconf_types::EngineMessage;

/// A `$placeholder value` pair used to fill in a reason code's message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Substitution {
    pub placeholder: String,
    pub value: String,
}

impl Display for Substitution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${} {}", self.placeholder, self.value)
    }
}

/// Why a check rejected an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Failure {
    pub reason: EngineMessage,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Substitution>,
}

/// The result of running one check: either [`ValidationResult::VALID`] or a
/// [`Failure`].
///
/// Results are plain values. Two results are equal when they carry the same
/// reason and the same substitutions in the same order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    failure: Option<Failure>,
}

impl ValidationResult {
    pub const VALID: ValidationResult = ValidationResult { failure: None };

    pub fn invalid(reason: EngineMessage) -> Self {
        Self { failure: Some(Failure { reason, params: Vec::new() }) }
    }

    /// Appends a substitution. Has no effect on a valid result.
    pub fn with(mut self, placeholder: &str, value: impl Display) -> Self {
        if let Some(failure) = self.failure.as_mut() {
            failure.params.push(Substitution {
                placeholder: placeholder.to_owned(),
                value: value.to_string(),
            });
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    pub fn reason(&self) -> Option<EngineMessage> {
        self.failure.as_ref().map(|f| f.reason)
    }

    pub fn params(&self) -> &[Substitution] {
        self.failure.as_ref().map_or(&[], |f| f.params.as_slice())
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }
}

impl From<Failure> for ValidationResult {
    fn from(failure: Failure) -> Self {
        Self { failure: Some(failure) }
    }
}

/// The terminal state of validating one operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Accepted,
    Rejected(Failure),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

impl From<ValidationResult> for Outcome {
    fn from(result: ValidationResult) -> Self {
        match result.failure {
            None => Outcome::Accepted,
            Some(failure) => Outcome::Rejected(failure),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn substitutions_only_attach_to_failures() {
        let valid = ValidationResult::VALID.with("interface", "IDE");
        assert_eq!(valid, ValidationResult::VALID);
        assert!(valid.params().is_empty());

        let invalid = ValidationResult::invalid(
            EngineMessage::ActionTypeFailedInterfaceDoesNotSupportReadOnlyAttr,
        )
        .with("interface", "IDE");
        assert_eq!(invalid.params().len(), 1);
        assert_eq!(invalid.params()[0].to_string(), "$interface IDE");
    }

    #[test]
    fn equality_is_structural() {
        let reason = EngineMessage::ActionTypeFailedVmIsNotDown;
        let a = ValidationResult::invalid(reason);
        let b = ValidationResult::invalid(reason);
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with("vmName", "vm1"));
    }

    #[test]
    fn outcome_serializes_with_reason_code() {
        let outcome: Outcome = ValidationResult::invalid(
            EngineMessage::ActionTypeFailedSgioIsFiltered,
        )
        .into();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["reason"], "ACTION_TYPE_FAILED_SGIO_IS_FILTERED");

        let accepted: Outcome = ValidationResult::VALID.into();
        assert!(accepted.is_accepted());
    }
}
