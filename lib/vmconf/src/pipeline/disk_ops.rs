// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attaching, changing, detaching and removing disks.

use slog::{o, Logger};
use uuid::Uuid;
use vmconf_types::{Disk, DiskStorageType, EngineMessage, Vm, VmDevice};

use crate::chain::{CheckChain, CheckResult};
use crate::lookup::Context;
use crate::result::ValidationResult;
use crate::validator::DiskValidator;

fn disk_log(log: &Logger, disk_id: Uuid) -> Logger {
    log.new(o!("disk_id" => disk_id.to_string()))
}

fn disk_not_found() -> ValidationResult {
    ValidationResult::invalid(EngineMessage::ActionTypeFailedDiskNotExist)
}

fn vm_not_found() -> ValidationResult {
    ValidationResult::invalid(EngineMessage::ActionTypeFailedVmNotFound)
}

/// Explains why the disk has no active attachment to `vm_id`.
fn not_attached(ctx: Context<'_>, vm_id: Uuid) -> CheckResult {
    if ctx.inventory.find_vm(vm_id)?.is_none() {
        return Ok(vm_not_found());
    }
    Ok(ValidationResult::invalid(
        EngineMessage::ActionTypeFailedDiskNotAttachedToVm,
    ))
}

/// Finds the active attachment of the disk to `vm_id`, ignoring attachments
/// made through the VM's snapshots.
fn active_attachment(
    attachments: &[(Vm, VmDevice)],
    vm_id: Uuid,
) -> Option<&(Vm, VmDevice)> {
    attachments
        .iter()
        .find(|(vm, device)| vm.id == vm_id && device.snapshot_id.is_none())
}

pub(super) fn attach(
    ctx: Context<'_>,
    log: &Logger,
    disk: &Disk,
    vm_id: Uuid,
    snapshot_id: Option<Uuid>,
) -> CheckResult {
    let log = disk_log(log, disk.id).new(o!("vm_id" => vm_id.to_string()));

    let Some(vm) = ctx.inventory.find_vm(vm_id)? else {
        return Ok(vm_not_found());
    };
    let Some(current) = ctx.inventory.find_disk(disk.id)? else {
        return Ok(disk_not_found());
    };
    let attachments = ctx.inventory.find_attachments_for_disk(disk.id)?;
    let already_attached = attachments.iter().any(|(attached, device)| {
        attached.id == vm_id && device.snapshot_id == snapshot_id
    });

    // What the disk is comes from the inventory; the request only decides
    // how it is attached.
    let stored = DiskValidator::new(&current, ctx);
    let validator = DiskValidator::new(disk, ctx);
    CheckChain::new(&log)
        .pure("not_infrastructure_store", || {
            stored.check_not_infrastructure_store()
        })
        .pure("not_protected_infrastructure_disk", || {
            stored.check_not_protected_infrastructure_disk()
        })
        .check_if(snapshot_id.is_some(), "snapshot_storage_type", || {
            Ok(stored.check_storage_type_not_in(&[
                DiskStorageType::Lun,
                DiskStorageType::Cinder,
            ]))
        })
        .pure("not_already_attached", || {
            if already_attached {
                ValidationResult::invalid(
                    EngineMessage::ActionTypeFailedDiskAlreadyAttachedToVm,
                )
                .with("vmName", &vm.name)
            } else {
                ValidationResult::VALID
            }
        })
        .pure("read_only_interface", || {
            validator.check_read_only_compatible_with_interface()
        })
        .check("interface_compatibility", || {
            validator.check_interface_compatibility(Some(&vm))
        })
        .check("interface_supported_for_vm", || {
            validator.check_interface_supported_for_vm(Some(&vm))
        })
        .pure("scsi_reservation", || {
            validator.check_scsi_reservation_valid(Some(&vm))
        })
        .finish()
}

/// Fields whose change has to reach a running guest, and so may only change
/// while every VM using the disk is down.
fn hot_fields_changed(current: &Disk, proposed: &Disk) -> bool {
    current.interface != proposed.interface
        || current.read_only != proposed.read_only
        || current.sgio != proposed.sgio
        || current.scsi_passthrough != proposed.scsi_passthrough
}

pub(super) fn update(
    ctx: Context<'_>,
    log: &Logger,
    proposed: &Disk,
    vm_id: Option<Uuid>,
) -> CheckResult {
    let log = disk_log(log, proposed.id);

    let Some(current) = ctx.inventory.find_disk(proposed.id)? else {
        return Ok(disk_not_found());
    };
    let attachments = ctx.inventory.find_attachments_for_disk(proposed.id)?;

    let vm = match vm_id {
        None => None,
        Some(vm_id) => {
            let Some((vm, _)) = active_attachment(&attachments, vm_id) else {
                return not_attached(ctx, vm_id);
            };
            Some(vm)
        }
    };

    let stored = DiskValidator::new(&current, ctx);
    let validator = DiskValidator::new(proposed, ctx);
    CheckChain::new(&log)
        .pure("not_infrastructure_store", || {
            stored.check_not_infrastructure_store()
        })
        .pure("not_protected_infrastructure_disk", || {
            stored.check_not_protected_infrastructure_disk()
        })
        .pure("read_only_interface", || {
            validator.check_read_only_compatible_with_interface()
        })
        .check("interface_compatibility", || {
            validator.check_interface_compatibility(vm)
        })
        .check_if(
            current.interface != proposed.interface,
            "interface_supported_for_vm",
            || validator.check_interface_supported_for_vm(vm),
        )
        .pure("scsi_reservation", || {
            validator.check_scsi_reservation_valid(vm)
        })
        .check_if(
            hot_fields_changed(&current, proposed),
            "plugged_only_to_down_vms",
            || {
                validator
                    .check_plugged_only_to_down_vms(false, Some(&attachments))
            },
        )
        .finish()
}

pub(super) fn detach(
    ctx: Context<'_>,
    log: &Logger,
    disk_id: Uuid,
    vm_id: Uuid,
) -> CheckResult {
    let log = disk_log(log, disk_id).new(o!("vm_id" => vm_id.to_string()));

    let Some(disk) = ctx.inventory.find_disk(disk_id)? else {
        return Ok(disk_not_found());
    };
    let attachments = ctx.inventory.find_attachments_for_disk(disk_id)?;
    let Some(attachment) = active_attachment(&attachments, vm_id) else {
        return not_attached(ctx, vm_id);
    };

    let validator = DiskValidator::new(&disk, ctx);
    CheckChain::new(&log)
        .pure("not_infrastructure_store", || {
            validator.check_not_infrastructure_store()
        })
        .pure("removable_protected_disks", || {
            validator.check_removable_protected_disks(&attachment.0)
        })
        .check("plugged_only_to_down_vms", || {
            validator.check_plugged_only_to_down_vms(
                false,
                Some(std::slice::from_ref(attachment)),
            )
        })
        .finish()
}

pub(super) fn remove(
    ctx: Context<'_>,
    log: &Logger,
    disk_id: Uuid,
) -> CheckResult {
    let log = disk_log(log, disk_id);

    let Some(disk) = ctx.inventory.find_disk(disk_id)? else {
        return Ok(disk_not_found());
    };
    let attachments = ctx.inventory.find_attachments_for_disk(disk_id)?;

    let validator = DiskValidator::new(&disk, ctx);
    CheckChain::new(&log)
        .pure("not_infrastructure_store", || {
            validator.check_not_infrastructure_store()
        })
        .pure("removable_protected_disks", || {
            attachments
                .iter()
                .map(|(vm, _)| validator.check_removable_protected_disks(vm))
                .find(|result| !result.is_valid())
                .unwrap_or(ValidationResult::VALID)
        })
        .check("plugged_only_to_down_vms", || {
            validator.check_plugged_only_to_down_vms(false, Some(&attachments))
        })
        .finish()
}

pub(super) fn remove_snapshots(
    ctx: Context<'_>,
    log: &Logger,
    disk_id: Uuid,
) -> CheckResult {
    let log = disk_log(log, disk_id);

    let Some(disk) = ctx.inventory.find_disk(disk_id)? else {
        return Ok(disk_not_found());
    };

    let validator = DiskValidator::new(&disk, ctx);
    CheckChain::new(&log)
        .pure("not_infrastructure_store", || {
            validator.check_not_infrastructure_store()
        })
        .check("plugged_only_to_down_vms", || {
            validator.check_plugged_only_to_down_vms(true, None)
        })
        .finish()
}
