use qaoa_core::errors::{ErrorInfo, QaoaError};
use qaoa_graph::{graph_from_matrix, CouplingMatrix, WeightedGraph};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the diagonal of the coupling matrix is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagonalPolicy {
    /// Draw a random ±1 self-coupling for every spin, like the off-diagonal entries.
    #[default]
    Random,
    /// Keep the diagonal at zero so the graph has no self-loops.
    Zero,
}

/// Generator for Sherrington-Kirkpatrick spin-glass instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SherringtonKirkpatrick {
    node_num: usize,
    diagonal: DiagonalPolicy,
}

/// A generated instance together with the matrix it was converted from.
#[derive(Debug, Clone, PartialEq)]
pub struct SkInstance {
    /// Symmetric coupling matrix with ±1 entries.
    pub matrix: CouplingMatrix,
    /// Weighted graph derived from [`SkInstance::matrix`].
    pub graph: WeightedGraph,
}

impl Default for SherringtonKirkpatrick {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NODE_NUM)
    }
}

impl SherringtonKirkpatrick {
    /// Number of spins used by [`SherringtonKirkpatrick::default`].
    pub const DEFAULT_NODE_NUM: usize = 5;

    /// Creates a generator for `node_num` spins with a random diagonal.
    pub fn new(node_num: usize) -> Self {
        Self {
            node_num,
            diagonal: DiagonalPolicy::Random,
        }
    }

    /// Selects how diagonal entries are produced.
    pub fn with_diagonal(mut self, diagonal: DiagonalPolicy) -> Self {
        self.diagonal = diagonal;
        self
    }

    /// Number of spins (graph nodes).
    pub fn node_num(&self) -> usize {
        self.node_num
    }

    /// Diagonal policy in effect.
    pub fn diagonal(&self) -> DiagonalPolicy {
        self.diagonal
    }

    /// Draws a fresh symmetric coupling matrix.
    pub fn coupling_matrix<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<CouplingMatrix, QaoaError> {
        let n = self.node_num;
        let len = n.checked_mul(n).ok_or_else(|| {
            QaoaError::Config(
                ErrorInfo::new("node-num-overflow", "node_num squared overflows usize")
                    .with_context("node_num", n.to_string()),
            )
        })?;
        let mut entries = vec![0.0; len];
        for i in 0..n {
            for j in 0..n {
                entries[i * n + j] = if i < j {
                    random_sign(rng)
                } else if i == j {
                    match self.diagonal {
                        DiagonalPolicy::Random => random_sign(rng),
                        DiagonalPolicy::Zero => 0.0,
                    }
                } else {
                    entries[j * n + i]
                };
            }
        }
        CouplingMatrix::from_row_major(n, entries)
    }

    /// Generates one instance as a weighted graph.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<WeightedGraph, QaoaError> {
        Ok(self.run_with_matrix(rng)?.graph)
    }

    /// Generates one instance and keeps the coupling matrix alongside the graph.
    pub fn run_with_matrix<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<SkInstance, QaoaError> {
        let matrix = self.coupling_matrix(rng)?;
        let graph = graph_from_matrix(&matrix)?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            diagonal = ?self.diagonal,
            "generated sherrington-kirkpatrick instance"
        );
        Ok(SkInstance { matrix, graph })
    }
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}
