// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serves the OS catalog and engine settings from parsed capability tables.

use vmconf_config_toml::{Config, Feature, OsEntry, VersionedSetting};
use vmconf_types::{DiskInterface, OsId, Version};

use crate::lookup::{EngineSettings, LookupError, OsCatalog};

/// Capability tables loaded once at startup.
#[derive(Debug)]
pub struct StaticCatalog {
    config: Config,
}

impl StaticCatalog {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn os(&self, os: OsId) -> Result<&OsEntry, LookupError> {
        self.config.os(os).ok_or(LookupError::UnknownOs(os))
    }
}

impl OsCatalog for StaticCatalog {
    fn is_disk_interface_supported(
        &self,
        os: OsId,
        version: Version,
        interface: DiskInterface,
    ) -> Result<bool, LookupError> {
        Ok(self.os(os)?.disk_interfaces(version).contains(&interface))
    }

    fn os_name(&self, os: OsId) -> Result<String, LookupError> {
        Ok(self.os(os)?.name.clone())
    }

    fn is_windows(&self, os: OsId) -> Result<bool, LookupError> {
        Ok(self.os(os)?.windows)
    }

    fn memory_bounds_mb(
        &self,
        os: OsId,
        version: Version,
    ) -> Result<(u64, u64), LookupError> {
        let entry = self.os(os)?;
        Ok((entry.min_memory_mb(version), entry.max_memory_mb(version)))
    }

    fn is_cpu_supported(
        &self,
        os: OsId,
        version: Version,
        cpu_name: &str,
    ) -> Result<bool, LookupError> {
        Ok(self.os(os)?.is_cpu_supported(version, cpu_name))
    }
}

impl EngineSettings for StaticCatalog {
    fn is_feature_supported(
        &self,
        feature: Feature,
        version: Version,
    ) -> Result<bool, LookupError> {
        Ok(self.config.is_feature_supported(feature, version))
    }

    fn versioned_limit(
        &self,
        setting: VersionedSetting,
        version: Version,
    ) -> Result<u32, LookupError> {
        self.config
            .settings
            .versioned(setting, version)
            .ok_or(LookupError::MissingSetting { setting, version })
    }

    fn max_vm_name_length(&self, windows: bool) -> Result<usize, LookupError> {
        let settings = &self.config.settings;
        Ok(if windows {
            settings.max_vm_name_length_windows
        } else {
            settings.max_vm_name_length_non_windows
        })
    }

    fn vm_min_memory_mb(&self) -> Result<u64, LookupError> {
        Ok(self.config.settings.vm_min_memory_mb)
    }

    fn valid_num_of_monitors(&self) -> Result<Vec<u32>, LookupError> {
        Ok(self.config.settings.valid_num_of_monitors.clone())
    }

    fn is_editing_protected_vm_allowed(&self) -> Result<bool, LookupError> {
        Ok(self.config.settings.allow_editing_hosted_engine)
    }
}
