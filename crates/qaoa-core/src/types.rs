use serde::{Deserialize, Serialize};

/// Reason an optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationStatus {
    /// The trust region shrank to the requested final radius.
    Converged,
    /// The objective evaluation budget was exhausted first.
    MaxEvaluations,
}

impl TerminationStatus {
    /// Short human readable description.
    pub fn describe(&self) -> &'static str {
        match self {
            TerminationStatus::Converged => "trust region reached the final radius",
            TerminationStatus::MaxEvaluations => "maximum number of function evaluations reached",
        }
    }
}

/// Outcome of a variational optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best parameter vector found (length `2p`).
    pub x: Vec<f64>,
    /// Objective value at [`OptimizationResult::x`].
    pub fun: f64,
    /// Number of objective evaluations consumed.
    pub nfev: usize,
    /// Why the optimizer stopped.
    pub status: TerminationStatus,
    /// Largest constraint violation at the returned point (0 when feasible).
    #[serde(default)]
    pub max_constraint_violation: f64,
}

impl OptimizationResult {
    /// Splits the result into the `(parameters, value, evaluations)` triple.
    pub fn into_triple(self) -> (Vec<f64>, f64, usize) {
        (self.x, self.fun, self.nfev)
    }
}
