// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An [`Inventory`] over entity snapshots held in memory.
//!
//! Useful for checking what the engine would decide about a hypothetical
//! state of the world, e.g. one written down in a file.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vmconf_types::{Cluster, ControllerKind, Disk, Host, Vm, VmDevice};

use crate::lookup::{Inventory, LookupError};

/// A controller device present on a VM.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Controller {
    pub vm_id: Uuid,
    pub kind: ControllerKind,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct InMemoryInventory {
    pub vms: Vec<Vm>,
    pub clusters: Vec<Cluster>,
    pub hosts: Vec<Host>,
    pub disks: Vec<Disk>,
    pub attachments: Vec<VmDevice>,
    pub controllers: Vec<Controller>,
}

impl InMemoryInventory {
    fn dangling(what: &str, id: Uuid) -> LookupError {
        LookupError::Backend {
            collaborator: "inventory",
            message: format!("attachment refers to missing {what} {id}"),
        }
    }

    fn vm(&self, id: Uuid) -> Option<&Vm> {
        self.vms.iter().find(|vm| vm.id == id)
    }

    fn disk(&self, id: Uuid) -> Option<&Disk> {
        self.disks.iter().find(|disk| disk.id == id)
    }
}

impl Inventory for InMemoryInventory {
    fn find_vm(&self, id: Uuid) -> Result<Option<Vm>, LookupError> {
        Ok(self.vm(id).cloned())
    }

    fn find_cluster(&self, id: Uuid) -> Result<Option<Cluster>, LookupError> {
        Ok(self.clusters.iter().find(|c| c.id == id).cloned())
    }

    fn find_host(&self, id: Uuid) -> Result<Option<Host>, LookupError> {
        Ok(self.hosts.iter().find(|h| h.id == id).cloned())
    }

    fn find_disk(&self, id: Uuid) -> Result<Option<Disk>, LookupError> {
        Ok(self.disk(id).cloned())
    }

    fn find_attachments_for_disk(
        &self,
        disk_id: Uuid,
    ) -> Result<Vec<(Vm, VmDevice)>, LookupError> {
        self.attachments
            .iter()
            .filter(|device| device.disk_id == disk_id)
            .map(|device| -> Result<_, LookupError> {
                let vm = self
                    .vm(device.vm_id)
                    .ok_or_else(|| Self::dangling("VM", device.vm_id))?;
                Ok((vm.clone(), device.clone()))
            })
            .collect()
    }

    /// Only attachments to the active VM are returned; disks attached
    /// through one of its snapshots are not.
    fn find_disks_for_vm(
        &self,
        vm_id: Uuid,
        only_plugged: bool,
    ) -> Result<Vec<(Disk, VmDevice)>, LookupError> {
        self.attachments
            .iter()
            .filter(|device| {
                device.vm_id == vm_id
                    && device.snapshot_id.is_none()
                    && (device.plugged || !only_plugged)
            })
            .map(|device| -> Result<_, LookupError> {
                let disk = self
                    .disk(device.disk_id)
                    .ok_or_else(|| Self::dangling("disk", device.disk_id))?;
                Ok((disk.clone(), device.clone()))
            })
            .collect()
    }

    fn is_vm_name_in_use(
        &self,
        name: &str,
        storage_pool_id: Uuid,
    ) -> Result<bool, LookupError> {
        Ok(self.vms.iter().any(|vm| {
            vm.name == name && vm.storage_pool_id == storage_pool_id
        }))
    }

    fn has_controller_attached(
        &self,
        vm_id: Uuid,
        kind: ControllerKind,
    ) -> Result<bool, LookupError> {
        Ok(self
            .controllers
            .iter()
            .any(|c| c.vm_id == vm_id && c.kind == kind))
    }
}
