// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rules applied when a VM's properties are updated.

use vmconf_config_toml::VersionedSetting;
use vmconf_types::{
    Cluster, DiskInterface, EngineMessage, MigrationSupport, Version, Vm,
};

use crate::chain::CheckResult;
use crate::lookup::Context;
use crate::result::ValidationResult;

/// Compares a proposed VM state against the VM as currently stored.
///
/// Limits and OS capabilities are looked up at the compatibility version the
/// VM will have after the update: the proposed custom version if one is set,
/// else the cluster's.
pub struct VmUpdateValidator<'a> {
    current: &'a Vm,
    proposed: &'a Vm,
    cluster: &'a Cluster,
    version: Version,
    ctx: Context<'a>,
}

impl<'a> VmUpdateValidator<'a> {
    pub fn new(
        current: &'a Vm,
        proposed: &'a Vm,
        cluster: &'a Cluster,
        ctx: Context<'a>,
    ) -> Self {
        let version = proposed
            .custom_compatibility_version
            .unwrap_or(cluster.compatibility_version);
        Self { current, proposed, cluster, version, ctx }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The name must be non-empty, made of letters, digits, `.`, `_` and `-`,
    /// and no longer than the limit for the guest OS family.
    pub fn check_name(&self) -> CheckResult {
        let name = &self.proposed.name;
        if name.is_empty() {
            return Ok(ValidationResult::invalid(
                EngineMessage::ActionTypeFailedNameMayNotBeEmpty,
            ));
        }

        if !name.chars().all(is_valid_name_char) {
            return Ok(ValidationResult::invalid(
                EngineMessage::ActionTypeFailedNameMayNotContainSpecialChars,
            ));
        }

        let windows = self.ctx.os.is_windows(self.proposed.os_id)?;
        let max_length = self.ctx.settings.max_vm_name_length(windows)?;
        if name.chars().count() > max_length {
            return Ok(ValidationResult::invalid(
                EngineMessage::ActionTypeFailedNameLengthIsTooLong,
            )
            .with("maxLength", max_length));
        }

        Ok(ValidationResult::VALID)
    }

    /// Memory must lie between the larger of the global and per-OS minimums
    /// and the OS maximum.
    pub fn check_memory(&self) -> CheckResult {
        let (os_min, os_max) =
            self.ctx.os.memory_bounds_mb(self.proposed.os_id, self.version)?;
        let min = os_min.max(self.ctx.settings.vm_min_memory_mb()?);

        let memory = self.proposed.memory_mb;
        if memory < min || memory > os_max {
            return Ok(ValidationResult::invalid(
                EngineMessage::ActionTypeFailedIllegalMemorySize,
            )
            .with("minMemorySize", min)
            .with("maxMemorySize", os_max));
        }

        Ok(ValidationResult::VALID)
    }

    pub fn check_monitors(&self) -> CheckResult {
        let valid = self.ctx.settings.valid_num_of_monitors()?;
        Ok(if valid.contains(&self.proposed.num_of_monitors) {
            ValidationResult::VALID
        } else {
            ValidationResult::invalid(
                EngineMessage::ActionTypeFailedIllegalNumOfMonitors,
            )
        })
    }

    /// Every topology dimension must be at least one, and each is capped by
    /// a limit that depends on the compatibility version.
    pub fn check_cpu_topology(&self) -> CheckResult {
        let topology = &self.proposed.cpu_topology;
        if topology.vcpus() == 0 {
            return Ok(ValidationResult::invalid(
                EngineMessage::ActionTypeFailedMinCpuCount,
            ));
        }

        let limits = [
            (
                VersionedSetting::MaxNumOfVmCpus,
                topology.vcpus(),
                EngineMessage::ActionTypeFailedMaxNumCpu,
                "maxNumOfCpus",
            ),
            (
                VersionedSetting::MaxNumOfVmSockets,
                u64::from(topology.sockets),
                EngineMessage::ActionTypeFailedMaxNumSockets,
                "maxNumOfSockets",
            ),
            (
                VersionedSetting::MaxNumOfCpuPerSocket,
                u64::from(topology.cores_per_socket),
                EngineMessage::ActionTypeFailedMaxCpuPerSocket,
                "maxNumOfCpuPerSocket",
            ),
            (
                VersionedSetting::MaxNumOfThreadsPerCpu,
                u64::from(topology.threads_per_core),
                EngineMessage::ActionTypeFailedMaxThreadsPerCpu,
                "maxNumOfThreadsPerCpu",
            ),
        ];

        for (setting, requested, reason, placeholder) in limits {
            let max = self.ctx.settings.versioned_limit(setting, self.version)?;
            if requested > u64::from(max) {
                return Ok(
                    ValidationResult::invalid(reason).with(placeholder, max)
                );
            }
        }

        Ok(ValidationResult::VALID)
    }

    pub fn check_name_unique(&self) -> CheckResult {
        if self.proposed.name == self.current.name {
            return Ok(ValidationResult::VALID);
        }

        let in_use = self.ctx.inventory.is_vm_name_in_use(
            &self.proposed.name,
            self.current.storage_pool_id,
        )?;
        Ok(if in_use {
            ValidationResult::invalid(
                EngineMessage::ActionTypeFailedNameAlreadyUsed,
            )
        } else {
            ValidationResult::VALID
        })
    }

    pub fn check_cluster_unchanged(&self) -> ValidationResult {
        if self.proposed.cluster_id == self.current.cluster_id {
            ValidationResult::VALID
        } else {
            ValidationResult::invalid(EngineMessage::VmCannotUpdateCluster)
        }
    }

    /// Every host the VM is pinned to must exist and be in the VM's cluster.
    pub fn check_dedicated_hosts(&self) -> CheckResult {
        for &host_id in &self.proposed.dedicated_hosts {
            let Some(host) = self.ctx.inventory.find_host(host_id)? else {
                return Ok(ValidationResult::invalid(
                    EngineMessage::ActionTypeFailedDedicatedVdsDoesNotExist,
                ));
            };

            if host.cluster_id != self.cluster.id {
                return Ok(ValidationResult::invalid(
                    EngineMessage::ActionTypeFailedDedicatedVdsNotInSameCluster,
                )
                .with("hostName", &host.name));
            }
        }

        Ok(ValidationResult::VALID)
    }

    /// The VM's CPU model, or the cluster's when the VM does not override it,
    /// must be usable by the guest OS. Passes when neither names a CPU.
    pub fn check_cpu_supported(&self) -> CheckResult {
        let cpu_name = self
            .proposed
            .cpu_name
            .as_deref()
            .or(self.cluster.cpu_name.as_deref());
        let Some(cpu_name) = cpu_name else {
            return Ok(ValidationResult::VALID);
        };

        let supported = self.ctx.os.is_cpu_supported(
            self.proposed.os_id,
            self.version,
            cpu_name,
        )?;
        if supported {
            return Ok(ValidationResult::VALID);
        }

        Ok(ValidationResult::invalid(
            EngineMessage::CpuTypeUnsupportedForTheGuestOs,
        )
        .with("cpuName", cpu_name)
        .with("osName", self.ctx.os.os_name(self.proposed.os_id)?))
    }

    /// VirtIO-SCSI cannot be turned off while a plugged disk still uses it.
    pub fn check_virtio_scsi_can_be_disabled(&self) -> CheckResult {
        let disks =
            self.ctx.inventory.find_disks_for_vm(self.current.id, true)?;
        let in_use = disks
            .iter()
            .any(|(disk, _)| disk.interface == DiskInterface::VirtioScsi);

        Ok(if in_use {
            ValidationResult::invalid(
                EngineMessage::CannotDisableVirtioScsiPluggedDisks,
            )
        } else {
            ValidationResult::VALID
        })
    }

    /// VirtIO-SCSI can only be turned on for a guest OS that supports it.
    pub fn check_virtio_scsi_can_be_enabled(&self) -> CheckResult {
        let supported = self.ctx.os.is_disk_interface_supported(
            self.proposed.os_id,
            self.version,
            DiskInterface::VirtioScsi,
        )?;

        Ok(if supported {
            ValidationResult::VALID
        } else {
            ValidationResult::invalid(
                EngineMessage::ActionTypeFailedIllegalOsTypeDoesNotSupportVirtioScsi,
            )
        })
    }

    /// The managed hosted-engine VM is read-only unless policy allows edits.
    pub fn check_hosted_engine_editable(&self) -> CheckResult {
        if !self.current.is_managed_hosted_engine()
            && !self.proposed.is_managed_hosted_engine()
        {
            return Ok(ValidationResult::VALID);
        }

        Ok(if self.ctx.settings.is_editing_protected_vm_allowed()? {
            ValidationResult::VALID
        } else {
            ValidationResult::invalid(
                EngineMessage::ActionTypeFailedEditingHostedEngineIsDisabled,
            )
        })
    }

    /// A VM holding a SCSI reservation through any plugged disk cannot be
    /// made migratable.
    pub fn check_migration_with_scsi_reservation(&self) -> CheckResult {
        if self.proposed.migration_support != MigrationSupport::Migratable {
            return Ok(ValidationResult::VALID);
        }

        let disks =
            self.ctx.inventory.find_disks_for_vm(self.current.id, true)?;
        let reserved =
            disks.iter().any(|(_, device)| device.using_scsi_reservation);

        Ok(if reserved {
            ValidationResult::invalid(
                EngineMessage::ActionTypeFailedVmUsesScsiReservation,
            )
        } else {
            ValidationResult::VALID
        })
    }
}

fn is_valid_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '_' | '-')
}
