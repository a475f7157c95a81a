// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-entity rule catalogs.
//!
//! A validator borrows one entity snapshot and the collaborators for the
//! duration of a call. Each `check_*` method evaluates a single rule and
//! returns either a verdict or, for rules that consult collaborators, a
//! [`crate::chain::CheckResult`]. Ordering rules into operations is left to
//! [`crate::pipeline`].

mod disk;
mod vm;

pub use disk::DiskValidator;
pub use vm::VmUpdateValidator;
