// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::{bail, Result};

use crate::util::*;

pub(crate) fn cmd_clippy(strict: bool, quiet: bool) -> Result<()> {
    let wroot = workspace_root()?;

    let mut cmd = cargo(&wroot, "clippy", quiet);
    cmd.args(["--no-deps", "--workspace", "--all-targets"]);
    if strict {
        cmd.args(["--", "-Dwarnings"]);
    }

    if !cmd.status()?.success() {
        bail!("Clippy failures detected")
    }
    Ok(())
}
