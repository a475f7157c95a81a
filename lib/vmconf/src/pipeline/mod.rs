// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decides whether a requested mutation may proceed.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use slog::{info, o, Logger};
use uuid::Uuid;
use vmconf_types::{Disk, Vm};

use crate::catalog::StaticCatalog;
use crate::lookup::{
    Context, EngineSettings, Inventory, LookupError, OsCatalog,
};
use crate::result::Outcome;

mod disk_ops;
mod update_vm;

/// A proposed change to a VM's properties.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct VmUpdate {
    /// The VM as it should look after the update. Its `id` selects the VM.
    pub vm: Vm,

    /// Set when the update turns the VM's VirtIO-SCSI controller on or off.
    #[serde(default)]
    pub virtio_scsi_enabled: Option<bool>,
}

/// A mutation the engine can be asked to validate.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    UpdateVm(VmUpdate),

    /// Attach an existing disk to a VM, or to one of its snapshots when
    /// `snapshot_id` is set.
    AttachDisk {
        disk: Disk,
        vm_id: Uuid,
        #[serde(default)]
        snapshot_id: Option<Uuid>,
    },

    /// Change a disk's properties. `vm_id` names the VM whose attachment
    /// the change is made through; omit it for a floating disk.
    UpdateDisk {
        disk: Disk,
        #[serde(default)]
        vm_id: Option<Uuid>,
    },

    DetachDisk { disk_id: Uuid, vm_id: Uuid },

    RemoveDisk { disk_id: Uuid },

    /// Remove the snapshots of a disk, leaving the active volume in place.
    RemoveDiskSnapshots { disk_id: Uuid },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::UpdateVm(_) => "update_vm",
            Operation::AttachDisk { .. } => "attach_disk",
            Operation::UpdateDisk { .. } => "update_disk",
            Operation::DetachDisk { .. } => "detach_disk",
            Operation::RemoveDisk { .. } => "remove_disk",
            Operation::RemoveDiskSnapshots { .. } => "remove_disk_snapshots",
        }
    }
}

/// The validation entry point.
///
/// An engine holds only its collaborators and a logger, so one instance can
/// serve any number of concurrent callers. Entity snapshots are loaded from
/// the inventory on every call.
pub struct Engine {
    inventory: Arc<dyn Inventory>,
    os: Arc<dyn OsCatalog>,
    settings: Arc<dyn EngineSettings>,
    log: Logger,
}

impl Engine {
    pub fn new(
        inventory: Arc<dyn Inventory>,
        os: Arc<dyn OsCatalog>,
        settings: Arc<dyn EngineSettings>,
        log: Logger,
    ) -> Self {
        Self { inventory, os, settings, log }
    }

    /// Creates an engine whose OS catalog and settings both come from one set
    /// of capability tables.
    pub fn with_catalog(
        inventory: Arc<dyn Inventory>,
        catalog: Arc<StaticCatalog>,
        log: Logger,
    ) -> Self {
        Self::new(inventory, catalog.clone(), catalog, log)
    }

    fn ctx(&self) -> Context<'_> {
        Context {
            inventory: self.inventory.as_ref(),
            os: self.os.as_ref(),
            settings: self.settings.as_ref(),
        }
    }

    /// Runs the checks for `op` in order and reports the first rejection.
    ///
    /// A rejection is a successful answer. `Err` means a collaborator failed
    /// and no answer could be reached.
    pub fn validate(&self, op: &Operation) -> Result<Outcome, LookupError> {
        let log = self.log.new(o!("operation" => op.kind()));
        let ctx = self.ctx();

        let result = match op {
            Operation::UpdateVm(update) => {
                update_vm::validate(ctx, &log, update)
            }
            Operation::AttachDisk { disk, vm_id, snapshot_id } => {
                disk_ops::attach(ctx, &log, disk, *vm_id, *snapshot_id)
            }
            Operation::UpdateDisk { disk, vm_id } => {
                disk_ops::update(ctx, &log, disk, *vm_id)
            }
            Operation::DetachDisk { disk_id, vm_id } => {
                disk_ops::detach(ctx, &log, *disk_id, *vm_id)
            }
            Operation::RemoveDisk { disk_id } => {
                disk_ops::remove(ctx, &log, *disk_id)
            }
            Operation::RemoveDiskSnapshots { disk_id } => {
                disk_ops::remove_snapshots(ctx, &log, *disk_id)
            }
        }?;

        let outcome = Outcome::from(result);
        match &outcome {
            Outcome::Accepted => info!(log, "operation accepted"),
            Outcome::Rejected(failure) => {
                info!(log, "operation rejected"; "reason" => %failure.reason)
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn operations_are_tagged_by_kind() {
        let op: Operation = serde_json::from_value(serde_json::json!({
            "kind": "detach_disk",
            "disk_id": "00000000-0000-0000-0000-000000000001",
            "vm_id": "00000000-0000-0000-0000-000000000002",
        }))
        .unwrap();
        assert_eq!(op.kind(), "detach_disk");
        assert!(matches!(op, Operation::DetachDisk { .. }));

        let op: Operation = serde_json::from_value(serde_json::json!({
            "kind": "remove_disk_snapshots",
            "disk_id": "00000000-0000-0000-0000-000000000001",
        }))
        .unwrap();
        assert_eq!(op.kind(), "remove_disk_snapshots");
    }

    #[test]
    fn unknown_kinds_are_refused() {
        let op = serde_json::from_value::<Operation>(serde_json::json!({
            "kind": "reboot_vm",
            "vm_id": "00000000-0000-0000-0000-000000000002",
        }));
        assert!(op.is_err());
    }
}
