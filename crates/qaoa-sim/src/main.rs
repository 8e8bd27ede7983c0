use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    ground_state::{self, GroundStateArgs},
    optimize::{self, OptimizeArgs},
    sk::{self, SkArgs},
    version::{self, VersionArgs},
};
use qaoa_core::RunProvenance;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "qaoa-sim", about = "SK instance generation and QAOA parameter optimization")]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace); RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate Sherrington-Kirkpatrick instances.
    Sk(SkArgs),
    /// Generate an SK instance and solve it exhaustively.
    GroundState(GroundStateArgs),
    /// Minimize a reference objective with COBYLA.
    Optimize(OptimizeArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let progress = matches!(&cli.command, Command::Optimize(args) if args.disp);
    init_tracing(cli.verbose.max(u8::from(progress)));
    match cli.command {
        Command::Sk(args) => sk::run(&args),
        Command::GroundState(args) => ground_state::run(&args),
        Command::Optimize(args) => optimize::run(&args),
        Command::Version(args) => version::run(&args),
    }
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

/// Provenance block shared by every emitted document.
pub(crate) fn provenance(
    producer: &str,
    graph_hash: String,
    seed: Option<u64>,
    substream: Option<u64>,
) -> RunProvenance {
    let mut tool_versions = BTreeMap::new();
    tool_versions.insert("qaoa-sim".to_string(), env!("CARGO_PKG_VERSION").to_string());
    RunProvenance {
        producer: producer.to_string(),
        graph_hash,
        seed,
        substream,
        tool_versions,
    }
}

/// Writes pretty JSON to `path`, or to stdout when no path is given.
pub(crate) fn write_json<T: Serialize>(
    path: Option<&Path>,
    value: &T,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
