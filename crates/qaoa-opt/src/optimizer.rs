use qaoa_core::errors::QaoaError;
use qaoa_core::{num_parameters, Objective, OptimizationResult, VariationalOptimizer};
use rand::{Rng, RngCore};
use tracing::{debug, info};

use crate::cobyla;
use crate::config::CobylaConfig;

/// COBYLA-backed optimizer for QAOA angles.
///
/// The optimizer is immutable once built: the starting point of every call is
/// either the configured one or freshly drawn from the caller's RNG.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cobyla {
    config: CobylaConfig,
}

impl Cobyla {
    /// Creates an optimizer from a full configuration.
    pub fn new(config: CobylaConfig) -> Self {
        Self { config }
    }

    /// Sets the evaluation budget.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.config.maxiter = maxiter;
        self
    }

    /// Fixes the starting point used by every call.
    pub fn with_initial_point(mut self, point: Vec<f64>) -> Self {
        self.config.initial_point = Some(point);
        self
    }

    /// Enables the `info`-level summary.
    pub fn with_disp(mut self, disp: bool) -> Self {
        self.config.disp = disp;
        self
    }

    /// Sets the initial trust-region radius.
    pub fn with_rhobeg(mut self, rhobeg: f64) -> Self {
        self.config.rhobeg = rhobeg;
        self
    }

    /// Sets the final trust-region radius.
    pub fn with_tol(mut self, tol: Option<f64>) -> Self {
        self.config.tol = tol;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &CobylaConfig {
        &self.config
    }

    /// Starting point for depth `depth`: the configured one, or `2 * depth`
    /// uniform draws in `[0, 1)`.
    pub fn starting_point(
        &self,
        depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, QaoaError> {
        let dimension = num_parameters(depth);
        self.config.check_initial_point(dimension)?;
        Ok(match &self.config.initial_point {
            Some(point) => point.clone(),
            None => (0..dimension).map(|_| rng.gen::<f64>()).collect(),
        })
    }
}

impl VariationalOptimizer for Cobyla {
    fn optimize(
        &self,
        objective: &mut dyn Objective,
        depth: usize,
        rng: &mut dyn RngCore,
    ) -> Result<OptimizationResult, QaoaError> {
        let options = self.config.options()?;
        let x0 = self.starting_point(depth, rng)?;
        debug!(depth, parameters = x0.len(), maxfun = options.maxfun, "starting cobyla");

        let result = cobyla::minimize(
            |params| objective.evaluate(params, depth),
            &x0,
            &[],
            &options,
        )?;

        if self.config.disp {
            info!(
                fun = result.fun,
                nfev = result.nfev,
                status = result.status.describe(),
                "optimization finished"
            );
        } else {
            debug!(fun = result.fun, nfev = result.nfev, "optimization finished");
        }
        Ok(result)
    }
}
