// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod task_clippy;
mod task_fmt;
mod task_prepush;
mod util;

#[derive(Parser)]
#[command(name = "cargo xtask", about = "Developer tasks for vmconf")]
struct Args {
    #[command(subcommand)]
    cmd: Cmds,
}

#[derive(Subcommand)]
enum Cmds {
    /// Run clippy over every crate and target
    Clippy {
        /// Treat warnings as errors
        #[arg(short, long)]
        strict: bool,

        /// Suppress cargo's own output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Format the workspace, or only check formatting
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run the workspace's tests
    Test {
        /// Only run tests whose name contains this string
        filter: Option<String>,
    },
    /// Run the checks expected to pass before pushing
    Prepush {
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    match Args::parse().cmd {
        Cmds::Clippy { strict, quiet } => {
            task_clippy::cmd_clippy(strict, quiet)
        }
        Cmds::Fmt { check } => task_fmt::cmd_fmt(check),
        Cmds::Test { filter } => task_test::cmd_test(filter.as_deref()),
        Cmds::Prepush { quiet } => task_prepush::cmd_prepush(quiet),
    }
}
