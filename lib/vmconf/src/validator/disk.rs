// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rules about disks and how they may be attached to VMs.

use vmconf_config_toml::Feature;
use vmconf_types::{
    ControllerKind, Disk, DiskInterface, DiskStorageType, EngineMessage,
    ScsiGenericIo, Vm, VmDevice,
};

use crate::chain::CheckResult;
use crate::lookup::Context;
use crate::result::ValidationResult;

/// Evaluates the rules for one disk snapshot.
///
/// Checks that take an `Option<&Vm>` treat `None` as a floating disk and skip
/// whatever depends on the VM.
pub struct DiskValidator<'a> {
    disk: &'a Disk,
    ctx: Context<'a>,
}

impl<'a> DiskValidator<'a> {
    pub fn new(disk: &'a Disk, ctx: Context<'a>) -> Self {
        Self { disk, ctx }
    }

    /// Checks that a VirtIO-SCSI disk can be used at all and, when attached,
    /// that the VM's cluster, devices and guest OS support it. Disks on any
    /// other interface pass.
    pub fn check_interface_compatibility(
        &self,
        vm: Option<&Vm>,
    ) -> CheckResult {
        if self.disk.interface != DiskInterface::VirtioScsi {
            return Ok(ValidationResult::VALID);
        }

        if self.disk.sgio.is_some()
            && self.disk.storage_type() == DiskStorageType::Image
        {
            return Ok(ValidationResult::invalid(
                EngineMessage::ScsiGenericIoIsNotSupportedForImageDisk,
            ));
        }

        let Some(vm) = vm else {
            return Ok(ValidationResult::VALID);
        };

        let version = vm.effective_compatibility_version();
        let settings = self.ctx.settings;
        if !settings.is_feature_supported(Feature::VirtioScsi, version)? {
            return Ok(ValidationResult::invalid(
                EngineMessage::VirtioScsiInterfaceIsNotAvailableForClusterLevel,
            ));
        }

        let controller = ControllerKind::VirtioScsi;
        if !self.ctx.inventory.has_controller_attached(vm.id, controller)? {
            return Ok(ValidationResult::invalid(
                EngineMessage::CannotPerformActionVirtioScsiIsDisabled,
            ));
        }

        self.check_os_supports_interface(DiskInterface::VirtioScsi, vm)
    }

    /// Checks that the VM's guest OS supports `interface` at the VM's
    /// compatibility version.
    pub fn check_os_supports_interface(
        &self,
        interface: DiskInterface,
        vm: &Vm,
    ) -> CheckResult {
        let supported = self.ctx.os.is_disk_interface_supported(
            vm.os_id,
            vm.effective_compatibility_version(),
            interface,
        )?;

        Ok(if supported {
            ValidationResult::VALID
        } else {
            ValidationResult::invalid(
                EngineMessage::ActionTypeFailedGuestOsVersionIsNotSupported,
            )
        })
    }

    /// Rejects if the disk is plugged into any VM that is not down.
    ///
    /// With `only_snapshot_scoped` set, only attachments made through a VM
    /// snapshot are considered. If `attachments` is `None` they are loaded
    /// from the inventory. When several VMs qualify, which one is reported
    /// is unspecified.
    pub fn check_plugged_only_to_down_vms(
        &self,
        only_snapshot_scoped: bool,
        attachments: Option<&[(Vm, VmDevice)]>,
    ) -> CheckResult {
        let loaded;
        let attachments = match attachments {
            Some(attachments) => attachments,
            None => {
                loaded = self
                    .ctx
                    .inventory
                    .find_attachments_for_disk(self.disk.id)?;
                loaded.as_slice()
            }
        };

        let running = attachments
            .iter()
            .filter(|(_, device)| {
                !only_snapshot_scoped || device.snapshot_id.is_some()
            })
            .find(|(vm, device)| device.plugged && !vm.is_down());

        Ok(match running {
            Some((vm, _)) => ValidationResult::invalid(
                EngineMessage::ActionTypeFailedVmIsNotDown,
            )
            .with("vmName", &vm.name),
            None => ValidationResult::VALID,
        })
    }

    /// Read-only disks cannot sit on IDE, and cannot pass SCSI commands
    /// through. The IDE rule is reported when both apply.
    pub fn check_read_only_compatible_with_interface(
        &self,
    ) -> ValidationResult {
        if !self.disk.read_only {
            return ValidationResult::VALID;
        }

        if self.disk.interface == DiskInterface::Ide {
            return ValidationResult::invalid(
                EngineMessage::ActionTypeFailedInterfaceDoesNotSupportReadOnlyAttr,
            )
            .with("interface", self.disk.interface);
        }

        if self.disk.scsi_passthrough {
            return ValidationResult::invalid(
                EngineMessage::ScsiPassthroughIsNotSupportedForReadOnlyDisk,
            );
        }

        ValidationResult::VALID
    }

    pub fn check_not_infrastructure_store(&self) -> ValidationResult {
        if self.disk.infrastructure_store {
            ValidationResult::invalid(
                EngineMessage::ActionTypeFailedOvfDiskNotSupported,
            )
        } else {
            ValidationResult::VALID
        }
    }

    /// Checks the disk's interface against the VM's guest OS. Floating disks
    /// pass.
    pub fn check_interface_supported_for_vm(
        &self,
        vm: Option<&Vm>,
    ) -> CheckResult {
        let Some(vm) = vm else {
            return Ok(ValidationResult::VALID);
        };

        let supported = self.ctx.os.is_disk_interface_supported(
            vm.os_id,
            vm.effective_compatibility_version(),
            self.disk.interface,
        )?;
        if supported {
            return Ok(ValidationResult::VALID);
        }

        Ok(ValidationResult::invalid(
            EngineMessage::ActionTypeDiskInterfaceUnsupported,
        )
        .with("osName", self.ctx.os.os_name(vm.os_id)?))
    }

    pub fn check_storage_type_not_in(
        &self,
        excluded: &[DiskStorageType],
    ) -> ValidationResult {
        let storage_type = self.disk.storage_type();
        if !excluded.contains(&storage_type) {
            return ValidationResult::VALID;
        }

        ValidationResult::invalid(
            EngineMessage::ActionTypeFailedNotSupportedDiskStorageType,
        )
        .with("diskStorageType", storage_type)
    }

    pub fn check_not_protected_infrastructure_disk(&self) -> ValidationResult {
        if self.disk.is_hosted_engine_lun() {
            ValidationResult::invalid(
                EngineMessage::ActionTypeFailedHostedEngineDisk,
            )
        } else {
            ValidationResult::VALID
        }
    }

    /// SCSI reservation needs a VM to reserve for, and unfiltered SGIO. Disks
    /// that are not LUNs cannot request a reservation and always pass.
    pub fn check_scsi_reservation_valid(
        &self,
        vm: Option<&Vm>,
    ) -> ValidationResult {
        let Some(lun) = self.disk.as_lun() else {
            return ValidationResult::VALID;
        };

        if !lun.using_scsi_reservation {
            return ValidationResult::VALID;
        }

        if vm.is_none() {
            return ValidationResult::invalid(
                EngineMessage::ActionTypeFailedScsiReservationNotValidForFloatingDisk,
            );
        }

        if self.disk.sgio == Some(ScsiGenericIo::Filtered) {
            return ValidationResult::invalid(
                EngineMessage::ActionTypeFailedSgioIsFiltered,
            );
        }

        ValidationResult::VALID
    }

    /// Disks of the hosted-engine VM may not be removed, with the exception
    /// of the hosted-engine LUN itself.
    pub fn check_removable_protected_disks(
        &self,
        vm: &Vm,
    ) -> ValidationResult {
        if self.disk.is_hosted_engine_lun() || !vm.is_hosted_engine() {
            ValidationResult::VALID
        } else {
            ValidationResult::invalid(
                EngineMessage::ActionTypeFailedHostedEngineDisk,
            )
        }
    }
}
