// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity snapshots shared by the vmconf crates.
//!
//! These are the read-only views of VMs, disks, clusters and hosts that the
//! validation engine consumes, plus the reason codes it produces. They carry
//! only the fields the engine's rules look at; how they are stored is up to
//! whoever loads them.

mod disk;
mod message;
mod version;
mod vm;

pub use disk::*;
pub use message::EngineMessage;
pub use version::{Version, VersionParseError};
pub use vm::*;
