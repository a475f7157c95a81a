// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use schemars::JsonSchema;
use serde::Deserialize;
use slog::{debug, o, Drain, Level, Logger};
use vmconf::{Engine, InMemoryInventory, Operation, Outcome, StaticCatalog};

/// Capability tables used when `--config` is not given.
const BUILTIN_CAPABILITIES: &str =
    include_str!("../../../crates/vmconf-config-toml/sample/capabilities.toml");

#[derive(Debug, Parser)]
#[clap(about, version)]
/// Decide whether a VM or disk operation would be allowed.
///
/// Exits 0 when the operation is accepted, 2 when it is rejected and 1 when
/// no decision could be reached.
struct Args {
    /// JSON file holding the inventory snapshot and the operation to check.
    #[clap(value_name = "SCENARIO", required_unless_present = "schema")]
    scenario: Option<PathBuf>,

    /// TOML file with the OS and compatibility-version capability tables.
    #[clap(short, long, action)]
    config: Option<PathBuf>,

    /// Print the outcome as JSON.
    #[clap(long, action)]
    json: bool,

    /// Enable debug logging of each check.
    #[clap(short, long, action)]
    debug: bool,

    /// Print the JSON schema of scenario files and exit.
    #[clap(long, action)]
    schema: bool,
}

/// A state of the world and a mutation proposed against it.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct Scenario {
    #[serde(default)]
    inventory: InMemoryInventory,
    operation: Operation,
}

fn parse_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| e.into())
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<StaticCatalog> {
    let config = match path {
        Some(path) => vmconf_config_toml::parse(path).with_context(|| {
            format!("failed to load capabilities from {}", path.display())
        })?,
        None => vmconf_config_toml::from_str(BUILTIN_CAPABILITIES)
            .context("built-in capability tables are malformed")?,
    };
    Ok(StaticCatalog::new(config))
}

/// Create a top-level logger that outputs to stderr
fn build_log(debug: bool) -> (Logger, slog_async::AsyncGuard) {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let level = if debug { Level::Debug } else { Level::Info };
    let drain = slog::LevelFilter(drain, level).fuse();
    let (drain, guard) = slog_async::Async::new(drain).build_with_guard();
    (Logger::root(drain.fuse(), o!()), guard)
}

fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Accepted => "accepted\n".to_string(),
        Outcome::Rejected(failure) => {
            let params: String = failure
                .params
                .iter()
                .map(|param| format!("  {param}\n"))
                .collect();
            format!("rejected: {}\n{params}", failure.reason)
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    if args.schema {
        let schema = schemars::schema_for!(Scenario);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(ExitCode::SUCCESS);
    }

    let (log, _log_async_guard) = build_log(args.debug);

    let path = args.scenario.context("no scenario file given")?;
    let scenario = parse_scenario(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let catalog = load_catalog(args.config.as_deref())?;
    debug!(log, "loaded scenario";
        "path" => %path.display(),
        "vms" => scenario.inventory.vms.len(),
        "disks" => scenario.inventory.disks.len(),
    );

    let engine = Engine::with_catalog(
        Arc::new(scenario.inventory),
        Arc::new(catalog),
        log.clone(),
    );
    let outcome = engine
        .validate(&scenario.operation)
        .context("validation could not complete")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render(&outcome));
    }

    if outcome.is_accepted() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
