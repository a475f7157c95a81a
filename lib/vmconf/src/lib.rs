// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validation engine for VM and disk configuration changes.
//!
//! Callers describe a mutation as an [`Operation`] and hand it to
//! [`Engine::validate`]. The engine loads the entities involved through an
//! [`Inventory`], runs the rules that apply to the operation in a fixed order,
//! and returns [`Outcome::Accepted`] or the first rejection together with the
//! parameters needed to render it. Rejections are ordinary values; an `Err`
//! only ever means that a collaborator failed.
//!
//! The rules themselves live in [`validator`] and may be used directly when a
//! caller needs a single check rather than a whole operation.

pub mod catalog;
pub mod chain;
pub mod inventory;
pub mod lookup;
pub mod pipeline;
pub mod result;
pub mod validator;

#[cfg(test)]
mod test_util;

pub use catalog::StaticCatalog;
pub use inventory::InMemoryInventory;
pub use lookup::{Context, EngineSettings, Inventory, LookupError, OsCatalog};
pub use pipeline::{Engine, Operation, VmUpdate};
pub use result::{Failure, Outcome, Substitution, ValidationResult};

pub use vmconf_config_toml::{Feature, VersionedSetting};
pub use vmconf_types as types;
