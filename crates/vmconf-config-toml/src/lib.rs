// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability tables for the validation engine, read from a TOML file.
//!
//! The tables answer the questions the engine asks about the environment it
//! validates against: which features a cluster compatibility version
//! provides, what a guest OS supports, and the limits an operator has
//! configured. They are parsed once and never change afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;
use vmconf_types::{Architecture, DiskInterface, OsId, Version};

/// A capability that only some cluster compatibility versions provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    VirtioScsi,
}

/// Settings whose value depends on the cluster compatibility version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionedSetting {
    MaxNumOfVmCpus,
    MaxNumOfVmSockets,
    MaxNumOfCpuPerSocket,
    MaxNumOfThreadsPerCpu,
}

/// Capability tables.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub features: Features,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default, rename = "os")]
    pub operating_systems: Vec<OsEntry>,
}

impl Config {
    pub fn is_feature_supported(
        &self,
        feature: Feature,
        version: Version,
    ) -> bool {
        let min = match feature {
            Feature::VirtioScsi => self.features.virtio_scsi,
        };
        min.is_some_and(|min| version >= min)
    }

    pub fn os(&self, id: OsId) -> Option<&OsEntry> {
        self.operating_systems.iter().find(|os| os.id == id)
    }
}

/// The first compatibility version at which each feature is available. An
/// absent entry means no version provides the feature.
#[derive(Default, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Features {
    pub virtio_scsi: Option<Version>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Settings {
    pub max_vm_name_length_windows: usize,
    pub max_vm_name_length_non_windows: usize,
    pub vm_min_memory_mb: u64,
    pub valid_num_of_monitors: Vec<u32>,

    /// Allows edits to the managed hosted-engine VM.
    pub allow_editing_hosted_engine: bool,

    /// Settings keyed by compatibility version. A version with no entry has
    /// no value for any versioned setting.
    #[serde(default)]
    pub versions: BTreeMap<Version, VersionedSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_vm_name_length_windows: 15,
            max_vm_name_length_non_windows: 64,
            vm_min_memory_mb: 256,
            valid_num_of_monitors: vec![1, 2, 4],
            allow_editing_hosted_engine: false,
            versions: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Looks up a `(setting, version)` pair.
    pub fn versioned(
        &self,
        setting: VersionedSetting,
        version: Version,
    ) -> Option<u32> {
        let entry = self.versions.get(&version)?;
        match setting {
            VersionedSetting::MaxNumOfVmCpus => entry.max_num_of_vm_cpus,
            VersionedSetting::MaxNumOfVmSockets => entry.max_num_of_vm_sockets,
            VersionedSetting::MaxNumOfCpuPerSocket => {
                entry.max_num_of_cpu_per_socket
            }
            VersionedSetting::MaxNumOfThreadsPerCpu => {
                entry.max_num_of_threads_per_cpu
            }
        }
    }
}

#[derive(Default, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct VersionedSettings {
    pub max_num_of_vm_cpus: Option<u32>,
    pub max_num_of_vm_sockets: Option<u32>,
    pub max_num_of_cpu_per_socket: Option<u32>,
    pub max_num_of_threads_per_cpu: Option<u32>,
}

/// A guest operating system known to the catalog.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct OsEntry {
    pub id: OsId,

    /// The display name used when reporting problems with this OS.
    pub name: String,

    #[serde(default)]
    pub windows: bool,

    #[serde(default)]
    pub architecture: Architecture,

    #[serde(default)]
    pub min_memory_mb: u64,
    pub max_memory_mb: u64,

    pub disk_interfaces: Vec<DiskInterface>,

    /// CPU models this OS cannot run on.
    #[serde(default)]
    pub unsupported_cpus: BTreeSet<String>,

    /// Per-version overrides of the fields above.
    #[serde(default)]
    pub versions: BTreeMap<Version, OsVersionOverride>,
}

impl OsEntry {
    pub fn disk_interfaces(&self, version: Version) -> &[DiskInterface] {
        self.versions
            .get(&version)
            .and_then(|o| o.disk_interfaces.as_deref())
            .unwrap_or(&self.disk_interfaces)
    }

    pub fn min_memory_mb(&self, version: Version) -> u64 {
        self.versions
            .get(&version)
            .and_then(|o| o.min_memory_mb)
            .unwrap_or(self.min_memory_mb)
    }

    pub fn max_memory_mb(&self, version: Version) -> u64 {
        self.versions
            .get(&version)
            .and_then(|o| o.max_memory_mb)
            .unwrap_or(self.max_memory_mb)
    }

    pub fn is_cpu_supported(&self, version: Version, cpu: &str) -> bool {
        let unsupported = self
            .versions
            .get(&version)
            .and_then(|o| o.unsupported_cpus.as_ref())
            .unwrap_or(&self.unsupported_cpus);
        !unsupported.contains(cpu)
    }
}

#[derive(Default, Serialize, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct OsVersionOverride {
    pub min_memory_mb: Option<u64>,
    pub max_memory_mb: Option<u64>,
    pub disk_interfaces: Option<Vec<DiskInterface>>,
    pub unsupported_cpus: Option<BTreeSet<String>>,
}

/// Errors which may be returned when parsing the capability tables.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Cannot parse toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OS id {0} is defined more than once")]
    DuplicateOs(OsId),

    #[error("OS {0} allows {1} MiB minimum memory but only {2} MiB maximum")]
    MemoryBoundsInverted(OsId, u64, u64),
}

/// Parses capability tables from a string and checks them for consistency.
pub fn from_str(contents: &str) -> Result<Config, ParseError> {
    let cfg = toml::from_str::<Config>(contents)?;

    let mut seen = BTreeSet::new();
    for os in &cfg.operating_systems {
        if !seen.insert(os.id) {
            return Err(ParseError::DuplicateOs(os.id));
        }
        if os.min_memory_mb > os.max_memory_mb {
            return Err(ParseError::MemoryBoundsInverted(
                os.id,
                os.min_memory_mb,
                os.max_memory_mb,
            ));
        }
    }

    Ok(cfg)
}

/// Parses a TOML file into a configuration object.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<Config, ParseError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    from_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../sample/capabilities.toml");

    fn v(major: u16, minor: u16) -> Version {
        Version::new(major, minor)
    }

    #[test]
    fn sample_parses() {
        let cfg = from_str(SAMPLE).unwrap();
        assert_eq!(cfg.operating_systems.len(), 4);
        assert_eq!(cfg.settings.valid_num_of_monitors, vec![1, 2, 4]);
        assert!(!cfg.settings.allow_editing_hosted_engine);
    }

    #[test]
    fn feature_availability_starts_at_min_version() {
        let cfg = from_str(SAMPLE).unwrap();
        assert!(!cfg.is_feature_supported(Feature::VirtioScsi, v(3, 2)));
        assert!(cfg.is_feature_supported(Feature::VirtioScsi, v(3, 3)));
        assert!(cfg.is_feature_supported(Feature::VirtioScsi, v(4, 2)));

        let empty = from_str("").unwrap();
        assert!(!empty.is_feature_supported(Feature::VirtioScsi, v(4, 2)));
    }

    #[test]
    fn versioned_settings_are_keyed_by_exact_version() {
        let cfg = from_str(SAMPLE).unwrap();
        let s = &cfg.settings;
        assert_eq!(
            s.versioned(VersionedSetting::MaxNumOfVmCpus, v(4, 2)),
            Some(384)
        );
        assert_eq!(
            s.versioned(VersionedSetting::MaxNumOfVmCpus, v(4, 1)),
            Some(288)
        );
        assert_eq!(s.versioned(VersionedSetting::MaxNumOfVmCpus, v(4, 0)), None);
    }

    #[test]
    fn os_overrides_apply_per_version() {
        let cfg = from_str(SAMPLE).unwrap();
        let xp = cfg.os(11).unwrap();
        assert_eq!(xp.disk_interfaces(v(4, 1)), &[DiskInterface::Ide]);
        assert_eq!(
            xp.disk_interfaces(v(4, 2)),
            &[DiskInterface::Ide, DiskInterface::Virtio]
        );

        let rhel = cfg.os(5).unwrap();
        assert!(!rhel.is_cpu_supported(v(4, 2), "Intel Conroe Family"));
        assert!(rhel.is_cpu_supported(v(4, 2), "Intel Haswell Family"));
        assert_eq!(rhel.min_memory_mb(v(4, 2)), 1024);
    }

    #[test]
    fn duplicate_os_ids_are_rejected() {
        let toml = r#"
            [[os]]
            id = 1
            name = "a"
            max-memory-mb = 1024
            disk-interfaces = ["ide"]

            [[os]]
            id = 1
            name = "b"
            max-memory-mb = 1024
            disk-interfaces = ["ide"]
        "#;
        assert!(matches!(from_str(toml), Err(ParseError::DuplicateOs(1))));
    }

    #[test]
    fn inverted_memory_bounds_are_rejected() {
        let toml = r#"
            [[os]]
            id = 1
            name = "a"
            min-memory-mb = 2048
            max-memory-mb = 1024
            disk-interfaces = ["ide"]
        "#;
        assert!(matches!(
            from_str(toml),
            Err(ParseError::MemoryBoundsInverted(1, 2048, 1024))
        ));
    }

    #[test]
    fn config_can_be_serialized_as_toml() {
        let cfg = from_str(SAMPLE).unwrap();
        let serialized = toml::ser::to_string(&cfg).unwrap();
        let deserialized = from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }
}
