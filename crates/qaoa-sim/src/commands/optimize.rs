use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use qaoa_core::{OptimizationResult, RngHandle, RunProvenance, VariationalOptimizer};
use qaoa_opt::objectives::{rosenbrock, sphere};
use qaoa_opt::{Cobyla, CobylaConfig};
use serde::Serialize;

use crate::{provenance, write_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectiveKind {
    /// Sum of squares.
    Sphere,
    /// Generalized Rosenbrock valley.
    Rosenbrock,
}

impl ObjectiveKind {
    fn evaluate(self, params: &[f64]) -> f64 {
        match self {
            ObjectiveKind::Sphere => sphere(params),
            ObjectiveKind::Rosenbrock => rosenbrock(params),
        }
    }
}

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Objective to minimize.
    #[arg(long, value_enum)]
    pub objective: ObjectiveKind,
    /// QAOA depth p; the optimizer tunes 2p parameters.
    #[arg(long, default_value_t = 1)]
    pub depth: usize,
    /// Maximum number of objective evaluations.
    #[arg(long, default_value_t = 30)]
    pub maxiter: usize,
    /// Initial trust-region radius.
    #[arg(long, default_value_t = 1.0)]
    pub rhobeg: f64,
    /// Final trust-region radius.
    #[arg(long, default_value_t = 1e-6)]
    pub tol: f64,
    /// Seed for the random starting point; OS entropy when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Comma separated starting point with 2p entries.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub initial_point: Option<Vec<f64>>,
    /// Log a convergence summary.
    #[arg(long)]
    pub disp: bool,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct OptimizeDocument {
    provenance: RunProvenance,
    objective: ObjectiveKind,
    depth: usize,
    config: CobylaConfig,
    result: OptimizationResult,
}

pub fn run(args: &OptimizeArgs) -> Result<(), Box<dyn Error>> {
    let config = CobylaConfig {
        maxiter: args.maxiter,
        initial_point: args.initial_point.clone(),
        disp: args.disp,
        rhobeg: args.rhobeg,
        tol: Some(args.tol),
    };
    let optimizer = Cobyla::new(config.clone());
    let mut rng = match args.seed {
        Some(seed) => RngHandle::from_seed(seed),
        None => RngHandle::from_entropy(),
    };
    let objective = args.objective;
    let result = optimizer.optimize(
        &mut |params: &[f64], _depth: usize| objective.evaluate(params),
        args.depth,
        &mut rng,
    )?;

    write_json(
        args.out.as_deref(),
        &OptimizeDocument {
            provenance: provenance("cobyla", String::new(), args.seed, None),
            objective,
            depth: args.depth,
            config,
            result,
        },
    )
}
