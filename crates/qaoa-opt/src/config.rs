use qaoa_core::errors::{ErrorInfo, QaoaError};
use serde::{Deserialize, Serialize};

use crate::cobyla::CobylaOptions;

/// Final trust-region radius used when no tolerance is configured.
pub const DEFAULT_RHOEND: f64 = 1e-4;

/// Settings of the [`crate::Cobyla`] optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CobylaConfig {
    /// Maximum number of objective evaluations.
    #[serde(default = "default_maxiter")]
    pub maxiter: usize,
    /// Fixed starting point; drawn per call from the RNG when absent.
    #[serde(default)]
    pub initial_point: Option<Vec<f64>>,
    /// Report the final summary at `info` level.
    #[serde(default)]
    pub disp: bool,
    /// Initial trust-region radius.
    #[serde(default = "default_rhobeg")]
    pub rhobeg: f64,
    /// Final trust-region radius.
    #[serde(default = "default_tol")]
    pub tol: Option<f64>,
}

fn default_maxiter() -> usize {
    30
}

fn default_rhobeg() -> f64 {
    1.0
}

fn default_tol() -> Option<f64> {
    Some(1e-6)
}

impl Default for CobylaConfig {
    fn default() -> Self {
        Self {
            maxiter: default_maxiter(),
            initial_point: None,
            disp: false,
            rhobeg: default_rhobeg(),
            tol: default_tol(),
        }
    }
}

impl CobylaConfig {
    /// Translates the configuration into routine options.
    pub fn options(&self) -> Result<CobylaOptions, QaoaError> {
        let options = CobylaOptions {
            rhobeg: self.rhobeg,
            rhoend: self.tol.unwrap_or(DEFAULT_RHOEND),
            maxfun: self.maxiter,
        };
        options.validate()?;
        Ok(options)
    }

    /// Checks the configured starting point against the `2p` parameters of depth `p`.
    pub fn check_initial_point(&self, expected: usize) -> Result<(), QaoaError> {
        match &self.initial_point {
            Some(point) if point.len() != expected => Err(QaoaError::Optimizer(
                ErrorInfo::new(
                    "dimension-mismatch",
                    "initial point length differs from the parameter count",
                )
                .with_context("expected", expected.to_string())
                .with_context("found", point.len().to_string())
                .with_hint("QAOA of depth p has 2p parameters"),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CobylaConfig::default();
        assert_eq!(config.maxiter, 30);
        assert_eq!(config.initial_point, None);
        assert!(!config.disp);
        assert_eq!(config.rhobeg, 1.0);
        assert_eq!(config.tol, Some(1e-6));
    }

    #[test]
    fn missing_tolerance_falls_back() {
        let config = CobylaConfig {
            tol: None,
            ..CobylaConfig::default()
        };
        assert_eq!(config.options().unwrap().rhoend, DEFAULT_RHOEND);
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config: CobylaConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CobylaConfig::default());
    }

    #[test]
    fn rejects_zero_budget() {
        let config = CobylaConfig {
            maxiter: 0,
            ..CobylaConfig::default()
        };
        assert_eq!(config.options().unwrap_err().code(), "invalid-options");
    }

    #[test]
    fn tolerance_above_rhobeg_is_rejected() {
        let config = CobylaConfig {
            rhobeg: 0.1,
            tol: Some(0.5),
            ..CobylaConfig::default()
        };
        let err = config.options().unwrap_err();
        assert_eq!(err.code(), "invalid-options");
        assert!(err.info().hint.is_some());
    }

    #[test]
    fn wrong_initial_point_length() {
        let config = CobylaConfig {
            initial_point: Some(vec![0.1, 0.2, 0.3]),
            ..CobylaConfig::default()
        };
        assert!(config.check_initial_point(3).is_ok());
        assert_eq!(
            config.check_initial_point(4).unwrap_err().code(),
            "dimension-mismatch"
        );
    }
}
