use std::fs;
use std::path::Path;

use qaoa_core::errors::{ErrorInfo, QaoaError};
use qaoa_core::rng::{derive_substream_seed, RngHandle};
use serde::{Deserialize, Serialize};

use crate::sk::{DiagonalPolicy, SherringtonKirkpatrick};

/// YAML-configurable description of a batch of SK instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkConfig {
    /// Number of spins per instance.
    #[serde(default = "default_node_num")]
    pub node_num: usize,
    /// Diagonal handling.
    #[serde(default)]
    pub diagonal: DiagonalPolicy,
    /// Number of instances generated for the batch.
    #[serde(default = "default_instances")]
    pub instances: usize,
    /// Master seed and labelling.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

fn default_node_num() -> usize {
    SherringtonKirkpatrick::DEFAULT_NODE_NUM
}

fn default_instances() -> usize {
    1
}

impl Default for SkConfig {
    fn default() -> Self {
        Self {
            node_num: default_node_num(),
            diagonal: DiagonalPolicy::default(),
            instances: default_instances(),
            seed_policy: SeedPolicy::default(),
        }
    }
}

/// Seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed; `None` draws every instance from OS entropy.
    #[serde(default = "default_master_seed")]
    pub master_seed: Option<u64>,
    /// Optional label recorded with the emitted instances.
    #[serde(default)]
    pub label: Option<String>,
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

fn default_master_seed() -> Option<u64> {
    Some(0x5EED_0F5C_0FFE_E5EE_u64)
}

impl SkConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, QaoaError> {
        serde_yaml::from_str(contents)
            .map_err(|err| QaoaError::Config(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, QaoaError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            QaoaError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            QaoaError::Config(info) => {
                QaoaError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Serializes the configuration back to YAML.
    pub fn to_yaml_string(&self) -> Result<String, QaoaError> {
        serde_yaml::to_string(self)
            .map_err(|err| QaoaError::Config(ErrorInfo::new("config-serialize", err.to_string())))
    }

    /// Builds the generator described by this configuration.
    pub fn generator(&self) -> SherringtonKirkpatrick {
        SherringtonKirkpatrick::new(self.node_num).with_diagonal(self.diagonal)
    }

    /// Seed of instance `index`, or `None` when the batch is unseeded.
    pub fn instance_seed(&self, index: usize) -> Option<u64> {
        self.seed_policy
            .master_seed
            .map(|master| derive_substream_seed(master, index as u64))
    }

    /// RNG for instance `index` of the batch.
    pub fn instance_rng(&self, index: usize) -> RngHandle {
        match self.instance_seed(index) {
            Some(seed) => RngHandle::from_seed(seed),
            None => RngHandle::from_entropy(),
        }
    }
}
