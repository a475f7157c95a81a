// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::process::Command;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

pub(crate) fn workspace_root() -> Result<Utf8PathBuf> {
    cargo_metadata::MetadataCommand::new()
        .no_deps()
        .exec()
        .context("Failed to run cargo metadata")
        .map(|meta| meta.workspace_root)
}

/// A `cargo <subcommand>` invocation rooted at the workspace.
pub(crate) fn cargo(
    wroot: &Utf8Path,
    subcommand: &str,
    quiet: bool,
) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg(subcommand).current_dir(wroot);
    if quiet {
        cmd.arg("--quiet");
    }
    cmd
}
