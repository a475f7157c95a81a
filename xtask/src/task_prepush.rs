// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::{bail, Result};

use crate::{task_clippy, task_fmt, task_test};

pub(crate) fn cmd_prepush(quiet: bool) -> Result<()> {
    let mut errs = Vec::new();
    let checks: [(&str, &dyn Fn() -> Result<()>); 3] = [
        ("fmt", &|| task_fmt::cmd_fmt(true)),
        ("clippy", &|| task_clippy::cmd_clippy(true, quiet)),
        ("test", &|| task_test::cmd_test(None)),
    ];

    for (name, func) in checks {
        if !quiet {
            println!("Checking {name}...");
        }
        if func().is_err() {
            errs.push(name);
        }
    }

    if !errs.is_empty() {
        bail!("Pre-push error(s) in: {}", errs.join(", "))
    }
    Ok(())
}
