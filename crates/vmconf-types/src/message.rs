// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reason codes attached to rejected operations.
//!
//! Codes are stable identifiers. A presentation layer looks them up in its
//! own message catalog and fills in the `$placeholder` substitutions carried
//! alongside them; nothing in this workspace renders localized text.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

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
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineMessage {
    // Disk interface and attachment rules.
    ScsiGenericIoIsNotSupportedForImageDisk,
    VirtioScsiInterfaceIsNotAvailableForClusterLevel,
    CannotPerformActionVirtioScsiIsDisabled,
    ActionTypeFailedGuestOsVersionIsNotSupported,
    ActionTypeDiskInterfaceUnsupported,
    ActionTypeFailedInterfaceDoesNotSupportReadOnlyAttr,
    ScsiPassthroughIsNotSupportedForReadOnlyDisk,
    ActionTypeFailedVmIsNotDown,
    ActionTypeFailedOvfDiskNotSupported,
    ActionTypeFailedNotSupportedDiskStorageType,
    ActionTypeFailedHostedEngineDisk,
    ActionTypeFailedScsiReservationNotValidForFloatingDisk,
    ActionTypeFailedSgioIsFiltered,
    ActionTypeFailedDiskNotExist,
    ActionTypeFailedDiskAlreadyAttachedToVm,
    ActionTypeFailedDiskNotAttachedToVm,

    // VM update rules.
    ActionTypeFailedVmNotFound,
    ActionTypeFailedClusterCanNotBeEmpty,
    ActionTypeFailedNameMayNotBeEmpty,
    ActionTypeFailedNameMayNotContainSpecialChars,
    ActionTypeFailedNameLengthIsTooLong,
    ActionTypeFailedIllegalMemorySize,
    ActionTypeFailedIllegalNumOfMonitors,
    ActionTypeFailedMinCpuCount,
    ActionTypeFailedMaxNumCpu,
    ActionTypeFailedMaxNumSockets,
    ActionTypeFailedMaxCpuPerSocket,
    ActionTypeFailedMaxThreadsPerCpu,
    ActionTypeFailedNameAlreadyUsed,
    VmCannotUpdateCluster,
    ActionTypeFailedDedicatedVdsDoesNotExist,
    ActionTypeFailedDedicatedVdsNotInSameCluster,
    CpuTypeUnsupportedForTheGuestOs,
    CannotDisableVirtioScsiPluggedDisks,
    ActionTypeFailedIllegalOsTypeDoesNotSupportVirtioScsi,
    ActionTypeFailedEditingHostedEngineIsDisabled,
    ActionTypeFailedVmUsesScsiReservation,
}
