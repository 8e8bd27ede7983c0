#![deny(missing_docs)]
#![doc = include_str!("../docs/core-api.md")]

use rand::RngCore;

pub mod errors;
pub mod provenance;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, QaoaError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{OptimizationResult, TerminationStatus};

/// Returns the number of variational parameters for a QAOA circuit of depth `p`
/// (one cost angle and one mixer angle per layer).
pub fn num_parameters(depth: usize) -> usize {
    2 * depth
}

/// Black-box objective evaluated by a [`VariationalOptimizer`].
pub trait Objective {
    /// Evaluates the objective for the given parameters at circuit depth `depth`.
    fn evaluate(&mut self, params: &[f64], depth: usize) -> f64;
}

impl<F> Objective for F
where
    F: FnMut(&[f64], usize) -> f64,
{
    fn evaluate(&mut self, params: &[f64], depth: usize) -> f64 {
        self(params, depth)
    }
}

/// Classical optimizer tuning QAOA variational parameters.
///
/// Implementations must treat the starting point as a per-call input: calling
/// `optimize` twice with different depths must never reuse state from the
/// first call.
pub trait VariationalOptimizer: Send + Sync {
    /// Minimizes `objective` over `2 * depth` parameters.
    ///
    /// `rng` is only consumed when the optimizer has to synthesize a starting
    /// point.
    fn optimize(
        &self,
        objective: &mut dyn Objective,
        depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<OptimizationResult, QaoaError>;
}
