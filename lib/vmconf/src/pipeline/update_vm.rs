// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use slog::{o, Logger};
use vmconf_types::EngineMessage;

use super::VmUpdate;
use crate::chain::{CheckChain, CheckResult};
use crate::lookup::Context;
use crate::result::ValidationResult;
use crate::validator::VmUpdateValidator;

pub(super) fn validate(
    ctx: Context<'_>,
    log: &Logger,
    update: &VmUpdate,
) -> CheckResult {
    let proposed = &update.vm;
    let log = log.new(o!("vm_id" => proposed.id.to_string()));

    let Some(current) = ctx.inventory.find_vm(proposed.id)? else {
        return Ok(ValidationResult::invalid(
            EngineMessage::ActionTypeFailedVmNotFound,
        ));
    };
    let Some(cluster) = ctx.inventory.find_cluster(current.cluster_id)? else {
        return Ok(ValidationResult::invalid(
            EngineMessage::ActionTypeFailedClusterCanNotBeEmpty,
        ));
    };

    let vm = VmUpdateValidator::new(&current, proposed, &cluster, ctx);
    let disabling_virtio_scsi = update.virtio_scsi_enabled == Some(false);
    let enabling_virtio_scsi = update.virtio_scsi_enabled == Some(true);

    CheckChain::new(&log)
        .check("name", || vm.check_name())
        .check("memory", || vm.check_memory())
        .check("monitors", || vm.check_monitors())
        .check("cpu_topology", || vm.check_cpu_topology())
        .check("name_unique", || vm.check_name_unique())
        .pure("cluster_unchanged", || vm.check_cluster_unchanged())
        .check("dedicated_hosts", || vm.check_dedicated_hosts())
        .check("cpu_supported", || vm.check_cpu_supported())
        .check_if(disabling_virtio_scsi, "virtio_scsi_disable", || {
            vm.check_virtio_scsi_can_be_disabled()
        })
        .check_if(enabling_virtio_scsi, "virtio_scsi_enable", || {
            vm.check_virtio_scsi_can_be_enabled()
        })
        .check("hosted_engine_editable", || {
            vm.check_hosted_engine_editable()
        })
        .check("scsi_reservation_migration", || {
            vm.check_migration_with_scsi_reservation()
        })
        .finish()
}
