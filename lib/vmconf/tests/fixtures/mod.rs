// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use std::sync::Arc;

use slog::{o, Drain, Logger};
use uuid::Uuid;
use vmconf::inventory::Controller;
use vmconf::types::{
    Architecture, Cluster, ControllerKind, CpuTopology, Disk, DiskBacking,
    DiskInterface, Host, ImageBacking, LunBacking, MigrationSupport,
    OriginType, ScsiGenericIo, Version, Vm, VmDevice, VmStatus,
};
use vmconf::{Context, Engine, InMemoryInventory, StaticCatalog};

pub const CAPABILITIES: &str = include_str!(
    "../../../../crates/vmconf-config-toml/sample/capabilities.toml"
);

/// Guest OS ids from the sample capability tables.
pub const OS_RHEL7: u32 = 5;
pub const OS_WINDOWS_XP: u32 = 11;

pub fn test_log() -> Logger {
    let decorator = slog_term::PlainSyncDecorator::new(
        slog_term::TestStdoutWriter,
    );
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    Logger::root(drain, o!())
}

pub fn catalog() -> Arc<StaticCatalog> {
    catalog_from(CAPABILITIES)
}

pub fn catalog_from(contents: &str) -> Arc<StaticCatalog> {
    let config = vmconf_config_toml::from_str(contents)
        .expect("sample capability tables parse");
    Arc::new(StaticCatalog::new(config))
}

pub fn image_disk(alias: &str, interface: DiskInterface) -> Disk {
    Disk {
        id: Uuid::new_v4(),
        alias: alias.to_owned(),
        interface,
        read_only: false,
        sgio: None,
        scsi_passthrough: false,
        infrastructure_store: false,
        backing: DiskBacking::Image(ImageBacking { size_bytes: 10 << 30 }),
    }
}

pub fn lun_disk(
    alias: &str,
    using_scsi_reservation: bool,
    sgio: Option<ScsiGenericIo>,
) -> Disk {
    Disk {
        sgio,
        backing: DiskBacking::Lun(LunBacking {
            lun_id: "3600a098038304437415d4b6a59684a52".to_owned(),
            using_scsi_reservation,
        }),
        ..image_disk(alias, DiskInterface::VirtioScsi)
    }
}

/// A single 4.2 cluster in one storage pool, and whatever is added to it.
pub struct World {
    pub inventory: InMemoryInventory,
    pub cluster: Cluster,
    pub storage_pool_id: Uuid,
}

impl World {
    pub fn new() -> Self {
        let cluster = Cluster {
            id: Uuid::new_v4(),
            compatibility_version: Version::new(4, 2),
            architecture: Architecture::X86_64,
            cpu_name: Some("Intel Haswell Family".to_owned()),
        };
        Self {
            inventory: InMemoryInventory {
                clusters: vec![cluster.clone()],
                ..Default::default()
            },
            cluster,
            storage_pool_id: Uuid::new_v4(),
        }
    }

    pub fn add_vm(&mut self, name: &str, status: VmStatus) -> Vm {
        let vm = Vm {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            status,
            cluster_id: self.cluster.id,
            storage_pool_id: self.storage_pool_id,
            os_id: OS_RHEL7,
            migration_support: MigrationSupport::ImplicitlyNonMigratable,
            origin: OriginType::Ovirt,
            cluster_compatibility_version: self.cluster.compatibility_version,
            custom_compatibility_version: None,
            memory_mb: 2048,
            num_of_monitors: 1,
            cpu_topology: CpuTopology {
                sockets: 2,
                cores_per_socket: 2,
                threads_per_core: 1,
            },
            cpu_name: None,
            dedicated_hosts: Vec::new(),
        };
        self.inventory.vms.push(vm.clone());
        vm
    }

    pub fn add_host(&mut self, name: &str, cluster_id: Uuid) -> Host {
        let host =
            Host { id: Uuid::new_v4(), name: name.to_owned(), cluster_id };
        self.inventory.hosts.push(host.clone());
        host
    }

    pub fn add_disk(&mut self, disk: &Disk) {
        self.inventory.disks.push(disk.clone());
    }

    pub fn attach(&mut self, vm: &Vm, disk: &Disk, plugged: bool) -> VmDevice {
        let device = VmDevice {
            vm_id: vm.id,
            disk_id: disk.id,
            plugged,
            snapshot_id: None,
            using_scsi_reservation: false,
        };
        self.inventory.attachments.push(device.clone());
        device
    }

    pub fn push_attachment(&mut self, device: VmDevice) {
        self.inventory.attachments.push(device);
    }

    pub fn add_virtio_scsi_controller(&mut self, vm: &Vm) {
        let kind = ControllerKind::VirtioScsi;
        self.inventory.controllers.push(Controller { vm_id: vm.id, kind });
    }

    pub fn ctx<'a>(&'a self, catalog: &'a StaticCatalog) -> Context<'a> {
        Context { inventory: &self.inventory, os: catalog, settings: catalog }
    }

    pub fn engine(&self) -> Engine {
        self.engine_with(catalog())
    }

    pub fn engine_with(&self, catalog: Arc<StaticCatalog>) -> Engine {
        Engine::with_catalog(Arc::new(self.inventory.clone()), catalog, test_log())
    }
}
