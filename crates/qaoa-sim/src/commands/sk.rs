use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use qaoa_apps::{DiagonalPolicy, SkConfig};
use qaoa_core::RunProvenance;
use qaoa_graph::{canonical_hash, CouplingMatrix, WeightedGraph};
use serde::Serialize;
use tracing::info;

use crate::{provenance, write_json};

#[derive(Args, Debug)]
pub struct SkArgs {
    /// Number of spins; overrides the configuration file.
    #[arg(long)]
    pub nodes: Option<usize>,
    /// Master seed; instances are drawn from OS entropy when neither this nor a config seed is set.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Keep the coupling diagonal at zero (no self-loops).
    #[arg(long)]
    pub zero_diagonal: bool,
    /// YAML batch configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of instances to generate; overrides the configuration file.
    #[arg(long)]
    pub count: Option<usize>,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InstanceDocument {
    pub provenance: RunProvenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub node_num: usize,
    pub diagonal: DiagonalPolicy,
    pub matrix: CouplingMatrix,
    pub graph: WeightedGraph,
}

pub(crate) fn resolve_config(
    config: Option<&Path>,
    nodes: Option<usize>,
    seed: Option<u64>,
    zero_diagonal: bool,
) -> Result<SkConfig, Box<dyn Error>> {
    let mut resolved = match config {
        Some(path) => SkConfig::load(path)?,
        None => {
            let mut fresh = SkConfig::default();
            fresh.seed_policy.master_seed = None;
            fresh
        }
    };
    if let Some(nodes) = nodes {
        resolved.node_num = nodes;
    }
    if seed.is_some() {
        resolved.seed_policy.master_seed = seed;
    }
    if zero_diagonal {
        resolved.diagonal = DiagonalPolicy::Zero;
    }
    Ok(resolved)
}

pub(crate) fn generate(
    config: &SkConfig,
    index: usize,
) -> Result<InstanceDocument, Box<dyn Error>> {
    let instance = config
        .generator()
        .run_with_matrix(&mut config.instance_rng(index))?;
    let hash = canonical_hash(&instance.graph);
    let seed = config.instance_seed(index);
    Ok(InstanceDocument {
        provenance: provenance(
            "sherrington-kirkpatrick",
            hash,
            seed,
            seed.map(|_| index as u64),
        ),
        label: config.seed_policy.label.clone(),
        node_num: config.node_num,
        diagonal: config.diagonal,
        matrix: instance.matrix,
        graph: instance.graph,
    })
}

pub fn run(args: &SkArgs) -> Result<(), Box<dyn Error>> {
    let mut config = resolve_config(
        args.config.as_deref(),
        args.nodes,
        args.seed,
        args.zero_diagonal,
    )?;
    if let Some(count) = args.count {
        config.instances = count;
    }
    info!(
        nodes = config.node_num,
        instances = config.instances,
        seeded = config.seed_policy.master_seed.is_some(),
        "generating sk instances"
    );

    let documents = (0..config.instances)
        .map(|index| generate(&config, index))
        .collect::<Result<Vec<_>, _>>()?;
    match documents.as_slice() {
        [single] => write_json(args.out.as_deref(), single),
        many => write_json(args.out.as_deref(), &many),
    }
}
