// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::{bail, Result};

use crate::util::*;

pub(crate) fn cmd_fmt(check: bool) -> Result<()> {
    let wroot = workspace_root()?;

    let mut cmd = cargo(&wroot, "fmt", false);
    cmd.arg("--all");
    if check {
        cmd.arg("--check");
    }

    if !cmd.status()?.success() {
        bail!("rustfmt failure(s) detected")
    }
    Ok(())
}
