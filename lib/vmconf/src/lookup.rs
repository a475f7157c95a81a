// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborators the engine consults while validating.
//!
//! The engine owns none of this state. Entity snapshots come from an
//! [`Inventory`] that is queried afresh on every call; what the platform
//! supports comes from an [`OsCatalog`] and [`EngineSettings`], which are
//! expected to be read-only for the life of the process. Any of them may fail,
//! and such failures are passed back to the caller untouched as a
//! [`LookupError`] rather than being turned into an accept or reject.

use thiserror::Error;
use uuid::Uuid;
use vmconf_config_toml::{Feature, VersionedSetting};
use vmconf_types::{
    Cluster, ControllerKind, Disk, DiskInterface, Host, OsId, Version, Vm,
    VmDevice,
};

/// A failure to answer a question the engine needed answered.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("guest OS {0} is not in the OS catalog")]
    UnknownOs(OsId),

    #[error("no value for {setting:?} at compatibility version {version}")]
    MissingSetting { setting: VersionedSetting, version: Version },

    #[error("{collaborator} failed: {message}")]
    Backend { collaborator: &'static str, message: String },
}

/// Loads entity snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait Inventory: Send + Sync {
    fn find_vm(&self, id: Uuid) -> Result<Option<Vm>, LookupError>;

    fn find_cluster(&self, id: Uuid) -> Result<Option<Cluster>, LookupError>;

    fn find_host(&self, id: Uuid) -> Result<Option<Host>, LookupError>;

    fn find_disk(&self, id: Uuid) -> Result<Option<Disk>, LookupError>;

    /// Returns every VM the disk is attached to, along with the attachment.
    fn find_attachments_for_disk(
        &self,
        disk_id: Uuid,
    ) -> Result<Vec<(Vm, VmDevice)>, LookupError>;

    /// Returns the disks attached to a VM. If `only_plugged` is set, unplugged
    /// attachments are left out.
    fn find_disks_for_vm(
        &self,
        vm_id: Uuid,
        only_plugged: bool,
    ) -> Result<Vec<(Disk, VmDevice)>, LookupError>;

    /// Returns true if any VM in the storage pool already uses `name`.
    fn is_vm_name_in_use(
        &self,
        name: &str,
        storage_pool_id: Uuid,
    ) -> Result<bool, LookupError>;

    fn has_controller_attached(
        &self,
        vm_id: Uuid,
        kind: ControllerKind,
    ) -> Result<bool, LookupError>;
}

/// What each guest operating system supports.
#[cfg_attr(test, mockall::automock)]
pub trait OsCatalog: Send + Sync {
    fn is_disk_interface_supported(
        &self,
        os: OsId,
        version: Version,
        interface: DiskInterface,
    ) -> Result<bool, LookupError>;

    /// The name to show users when reporting a problem with this OS.
    fn os_name(&self, os: OsId) -> Result<String, LookupError>;

    fn is_windows(&self, os: OsId) -> Result<bool, LookupError>;

    /// Returns the `(min, max)` memory sizes in MiB the OS can run with.
    fn memory_bounds_mb(
        &self,
        os: OsId,
        version: Version,
    ) -> Result<(u64, u64), LookupError>;

    fn is_cpu_supported(
        &self,
        os: OsId,
        version: Version,
        cpu_name: &str,
    ) -> Result<bool, LookupError>;
}

/// Feature availability, operator-configured limits and global policy.
#[cfg_attr(test, mockall::automock)]
pub trait EngineSettings: Send + Sync {
    fn is_feature_supported(
        &self,
        feature: Feature,
        version: Version,
    ) -> Result<bool, LookupError>;

    /// Looks up a setting whose value depends on the compatibility version.
    fn versioned_limit(
        &self,
        setting: VersionedSetting,
        version: Version,
    ) -> Result<u32, LookupError>;

    fn max_vm_name_length(&self, windows: bool) -> Result<usize, LookupError>;

    fn vm_min_memory_mb(&self) -> Result<u64, LookupError>;

    fn valid_num_of_monitors(&self) -> Result<Vec<u32>, LookupError>;

    /// Whether the managed hosted-engine VM may be edited.
    fn is_editing_protected_vm_allowed(&self) -> Result<bool, LookupError>;
}

/// The collaborators a validator consults, borrowed for one validation call.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub inventory: &'a dyn Inventory,
    pub os: &'a dyn OsCatalog,
    pub settings: &'a dyn EngineSettings,
}
