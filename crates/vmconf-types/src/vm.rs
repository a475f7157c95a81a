// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Virtual machines and the clusters and hosts they belong to.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Version;

/// Identifies a guest operating system in the OS catalog.
pub type OsId = u32;

/// A VM's lifecycle status as last reported by its host.
#[derive(
    Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum VmStatus {
    Down,
    Up,
    PoweringUp,
    Paused,
    Suspended,
    MigratingFrom,
    MigratingTo,
    RebootInProgress,
    PoweringDown,
    ImageLocked,
    NotResponding,
    Unknown,
}

/// Where a VM came from. Hosted-engine origins mark the VM that runs the
/// management stack itself.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    JsonSchema,
    Default,
)]
#[serde(rename_all = "snake_case")]
pub enum OriginType {
    #[default]
    Ovirt,
    HostedEngine,
    ManagedHostedEngine,
    External,
    Vmware,
    Xen,
    Kvm,
}

#[derive(
    Clone,
    Copy,
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    JsonSchema,
    Default,
)]
#[serde(rename_all = "snake_case")]
pub enum MigrationSupport {
    #[default]
    Migratable,
    ImplicitlyNonMigratable,
    PinnedToHost,
}

#[derive(
    Clone,
    Copy,
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    JsonSchema,
    Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    #[default]
    X86_64,
    Ppc64,
    S390x,
}

/// The guest-visible CPU layout of a VM.
#[derive(
    Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema,
)]
#[serde(deny_unknown_fields)]
pub struct CpuTopology {
    pub sockets: u32,
    pub cores_per_socket: u32,
    pub threads_per_core: u32,
}

impl CpuTopology {
    /// Total vCPU count, saturating at `u64::MAX`.
    pub fn vcpus(&self) -> u64 {
        u64::from(self.sockets)
            .saturating_mul(u64::from(self.cores_per_socket))
            .saturating_mul(u64::from(self.threads_per_core))
    }
}

impl Default for CpuTopology {
    fn default() -> Self {
        Self { sockets: 1, cores_per_socket: 1, threads_per_core: 1 }
    }
}

/// A snapshot of a virtual machine.
///
/// The same type describes both a VM as loaded from the inventory and the
/// state an update operation proposes for it. In the latter case the
/// runtime fields (`status`, `cluster_compatibility_version`) are taken from
/// the loaded VM, not from the proposal.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Vm {
    pub id: Uuid,
    pub name: String,
    pub status: VmStatus,
    pub cluster_id: Uuid,
    pub storage_pool_id: Uuid,
    pub os_id: OsId,

    #[serde(default)]
    pub migration_support: MigrationSupport,

    #[serde(default)]
    pub origin: OriginType,

    /// The compatibility version of the cluster this VM runs in.
    pub cluster_compatibility_version: Version,

    /// Overrides the cluster's compatibility version for this VM only.
    #[serde(default)]
    pub custom_compatibility_version: Option<Version>,

    pub memory_mb: u64,

    #[serde(default = "default_num_of_monitors")]
    pub num_of_monitors: u32,

    #[serde(default)]
    pub cpu_topology: CpuTopology,

    /// A CPU model name that overrides the cluster's CPU for this VM.
    #[serde(default)]
    pub cpu_name: Option<String>,

    /// Hosts this VM is pinned to. Empty means any host in the cluster.
    #[serde(default)]
    pub dedicated_hosts: Vec<Uuid>,
}

fn default_num_of_monitors() -> u32 {
    1
}

impl Vm {
    /// The compatibility version that gates features for this VM.
    pub fn effective_compatibility_version(&self) -> Version {
        self.custom_compatibility_version
            .unwrap_or(self.cluster_compatibility_version)
    }

    pub fn is_hosted_engine(&self) -> bool {
        matches!(
            self.origin,
            OriginType::HostedEngine | OriginType::ManagedHostedEngine
        )
    }

    pub fn is_managed_hosted_engine(&self) -> bool {
        self.origin == OriginType::ManagedHostedEngine
    }

    pub fn is_down(&self) -> bool {
        self.status == VmStatus::Down
    }
}

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Cluster {
    pub id: Uuid,
    pub compatibility_version: Version,

    #[serde(default)]
    pub architecture: Architecture,

    /// The CPU model name every host in this cluster provides.
    #[serde(default)]
    pub cpu_name: Option<String>,
}

/// A compute host.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Host {
    pub id: Uuid,
    pub name: String,
    pub cluster_id: Uuid,
}

#[cfg(test)]
mod test {
    use super::*;

    fn vm(origin: OriginType) -> Vm {
        Vm {
            id: Uuid::nil(),
            name: "vm1".to_owned(),
            status: VmStatus::Down,
            cluster_id: Uuid::nil(),
            storage_pool_id: Uuid::nil(),
            os_id: 0,
            migration_support: MigrationSupport::Migratable,
            origin,
            cluster_compatibility_version: Version::new(4, 2),
            custom_compatibility_version: None,
            memory_mb: 1024,
            num_of_monitors: 1,
            cpu_topology: CpuTopology::default(),
            cpu_name: None,
            dedicated_hosts: vec![],
        }
    }

    #[test]
    fn custom_version_overrides_cluster_version() {
        let mut vm = vm(OriginType::Ovirt);
        assert_eq!(vm.effective_compatibility_version(), Version::new(4, 2));
        vm.custom_compatibility_version = Some(Version::new(4, 1));
        assert_eq!(vm.effective_compatibility_version(), Version::new(4, 1));
    }

    #[test]
    fn hosted_engine_origins() {
        assert!(vm(OriginType::HostedEngine).is_hosted_engine());
        assert!(vm(OriginType::ManagedHostedEngine).is_hosted_engine());
        assert!(!vm(OriginType::HostedEngine).is_managed_hosted_engine());
        assert!(!vm(OriginType::Ovirt).is_hosted_engine());
    }

    #[test]
    fn huge_topologies_do_not_wrap() {
        let topology = CpuTopology {
            sockets: u32::MAX,
            cores_per_socket: u32::MAX,
            threads_per_core: u32::MAX,
        };
        assert_eq!(topology.vcpus(), u64::MAX);

        let topology = CpuTopology { sockets: 0, ..topology };
        assert_eq!(topology.vcpus(), 0);
    }

    #[test]
    fn vm_deserializes_with_defaults() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "db",
            "status": "up",
            "cluster_id": "00000000-0000-0000-0000-000000000002",
            "storage_pool_id": "00000000-0000-0000-0000-000000000003",
            "os_id": 5,
            "cluster_compatibility_version": "4.2",
            "memory_mb": 2048
        }"#;
        let vm: Vm = serde_json::from_str(json).unwrap();
        assert_eq!(vm.status, VmStatus::Up);
        assert_eq!(vm.origin, OriginType::Ovirt);
        assert_eq!(vm.num_of_monitors, 1);
        assert_eq!(vm.cpu_topology.vcpus(), 1);
    }
}
