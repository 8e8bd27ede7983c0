use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use qaoa_apps::{brute_force_ground_state, GroundState};
use serde::Serialize;
use tracing::info;

use crate::commands::sk::{generate, resolve_config, InstanceDocument};
use crate::write_json;

#[derive(Args, Debug)]
pub struct GroundStateArgs {
    /// Number of spins (at most 24).
    #[arg(long, default_value_t = 5)]
    pub nodes: usize,
    /// Seed of the generated instance.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Keep the coupling diagonal at zero (no self-loops).
    #[arg(long)]
    pub zero_diagonal: bool,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GroundStateDocument {
    instance: InstanceDocument,
    ground_state: GroundState,
}

pub fn run(args: &GroundStateArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(None, Some(args.nodes), args.seed, args.zero_diagonal)?;
    let instance = generate(&config, 0)?;
    let ground_state = brute_force_ground_state(&instance.graph)?;
    info!(
        energy = ground_state.energy,
        degeneracy = ground_state.degeneracy,
        "exhaustive search finished"
    );
    write_json(
        args.out.as_deref(),
        &GroundStateDocument {
            instance,
            ground_state,
        },
    )
}
