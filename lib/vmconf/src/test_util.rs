// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshots and mocked collaborators shared by unit tests.

use uuid::Uuid;
use vmconf_types::{
    Architecture, Cluster, CpuTopology, Disk, DiskBacking, DiskInterface,
    ImageBacking, MigrationSupport, OriginType, Version, Vm, VmStatus,
};

use crate::lookup::{
    Context, MockEngineSettings, MockInventory, MockOsCatalog,
};

pub(crate) struct Mocks {
    pub inventory: MockInventory,
    pub os: MockOsCatalog,
    pub settings: MockEngineSettings,
}

impl Mocks {
    pub fn new() -> Self {
        Self {
            inventory: MockInventory::new(),
            os: MockOsCatalog::new(),
            settings: MockEngineSettings::new(),
        }
    }

    pub fn ctx(&self) -> Context<'_> {
        Context {
            inventory: &self.inventory,
            os: &self.os,
            settings: &self.settings,
        }
    }

    /// Everything a VirtIO-SCSI disk needs is in place.
    pub fn virtio_scsi_ready(mut self) -> Self {
        self.settings
            .expect_is_feature_supported()
            .returning(|_, _| Ok(true));
        self.inventory
            .expect_has_controller_attached()
            .returning(|_, _| Ok(true));
        self.os
            .expect_is_disk_interface_supported()
            .returning(|_, _, _| Ok(true));
        self
    }
}

/// A stopped VM running OS 0 in a 4.2 cluster.
pub(crate) fn test_vm() -> Vm {
    Vm {
        id: Uuid::new_v4(),
        name: "vm1".to_owned(),
        status: VmStatus::Down,
        cluster_id: Uuid::new_v4(),
        storage_pool_id: Uuid::new_v4(),
        os_id: 0,
        migration_support: MigrationSupport::ImplicitlyNonMigratable,
        origin: OriginType::Ovirt,
        cluster_compatibility_version: Version::new(4, 2),
        custom_compatibility_version: None,
        memory_mb: 1024,
        num_of_monitors: 1,
        cpu_topology: CpuTopology::default(),
        cpu_name: None,
        dedicated_hosts: Vec::new(),
    }
}

pub(crate) fn test_cluster(vm: &Vm) -> Cluster {
    Cluster {
        id: vm.cluster_id,
        compatibility_version: vm.cluster_compatibility_version,
        architecture: Architecture::X86_64,
        cpu_name: None,
    }
}

/// A 1 GiB writable image disk.
pub(crate) fn test_disk(interface: DiskInterface) -> Disk {
    Disk {
        id: Uuid::new_v4(),
        alias: "disk1".to_owned(),
        interface,
        read_only: false,
        sgio: None,
        scsi_passthrough: false,
        infrastructure_store: false,
        backing: DiskBacking::Image(ImageBacking { size_bytes: 1 << 30 }),
    }
}
