// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Disks and their attachments to VMs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The alias reserved for the direct-LUN disk backing the hosted-engine VM.
pub const HOSTED_ENGINE_LUN_DISK_ALIAS: &str = "hosted_engine";

/// The bus through which a disk is presented to the guest.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    Hash,
    JsonSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
pub enum DiskInterface {
    #[strum(serialize = "IDE")]
    Ide,
    #[strum(serialize = "VirtIO")]
    Virtio,
    #[strum(serialize = "VirtIO_SCSI")]
    VirtioScsi,
    #[strum(serialize = "SPAPR_VSCSI")]
    SpaprVscsi,
    #[strum(serialize = "SATA")]
    Sata,
}

/// The kind of storage behind a disk, derived from its [`DiskBacking`].
#[derive(
    Clone,
    Copy,
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    Hash,
    JsonSchema,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DiskStorageType {
    Image,
    Lun,
    Cinder,
}

/// Whether raw SCSI commands issued by the guest reach the underlying LUN.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    JsonSchema,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ScsiGenericIo {
    Filtered,
    Unfiltered,
}

/// Controller devices a VM may carry.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    Hash,
    JsonSchema,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerKind {
    #[strum(serialize = "virtio-scsi")]
    VirtioScsi,
    #[strum(serialize = "spapr-vscsi")]
    SpaprVscsi,
}

/// An image-based disk: a volume chain on a storage domain.
#[derive(
    Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema,
)]
#[serde(deny_unknown_fields)]
pub struct ImageBacking {
    pub size_bytes: u64,
}

/// A directly attached LUN.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LunBacking {
    pub lun_id: String,

    /// Whether SCSI persistent reservation is requested for the attachment
    /// being validated.
    #[serde(default)]
    pub using_scsi_reservation: bool,
}

/// A volume provided by an external block storage service.
#[derive(
    Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema,
)]
#[serde(deny_unknown_fields)]
pub struct CinderBacking {
    pub size_bytes: u64,
}

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiskBacking {
    Image(ImageBacking),
    Lun(LunBacking),
    Cinder(CinderBacking),
}

/// A snapshot of a disk.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Disk {
    pub id: Uuid,
    pub alias: String,
    pub interface: DiskInterface,

    #[serde(default)]
    pub read_only: bool,

    /// Unset unless the disk was explicitly configured for SCSI generic IO.
    #[serde(default)]
    pub sgio: Option<ScsiGenericIo>,

    #[serde(default)]
    pub scsi_passthrough: bool,

    /// Marks internal bookkeeping volumes (e.g. OVF stores) that users may
    /// never operate on directly.
    #[serde(default)]
    pub infrastructure_store: bool,

    pub backing: DiskBacking,
}

impl Disk {
    pub fn storage_type(&self) -> DiskStorageType {
        match self.backing {
            DiskBacking::Image(_) => DiskStorageType::Image,
            DiskBacking::Lun(_) => DiskStorageType::Lun,
            DiskBacking::Cinder(_) => DiskStorageType::Cinder,
        }
    }

    /// The provisioned size of the disk. LUNs are sized by the array and
    /// report `None`.
    pub fn size_bytes(&self) -> Option<u64> {
        match &self.backing {
            DiskBacking::Image(ImageBacking { size_bytes })
            | DiskBacking::Cinder(CinderBacking { size_bytes }) => {
                Some(*size_bytes)
            }
            DiskBacking::Lun(_) => None,
        }
    }

    pub fn as_lun(&self) -> Option<&LunBacking> {
        match &self.backing {
            DiskBacking::Lun(lun) => Some(lun),
            _ => None,
        }
    }

    /// Returns true if this is the direct-LUN disk that backs the
    /// hosted-engine VM.
    pub fn is_hosted_engine_lun(&self) -> bool {
        self.as_lun().is_some() && self.alias == HOSTED_ENGINE_LUN_DISK_ALIAS
    }
}

/// The attachment of a disk to a VM.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VmDevice {
    pub vm_id: Uuid,
    pub disk_id: Uuid,
    pub plugged: bool,

    /// Set when the disk is attached through one of the VM's snapshots rather
    /// than to the active VM.
    #[serde(default)]
    pub snapshot_id: Option<Uuid>,

    #[serde(default)]
    pub using_scsi_reservation: bool,
}
