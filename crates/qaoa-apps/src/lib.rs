#![deny(missing_docs)]
#![doc = include_str!("../docs/apps-api.md")]

/// Configuration types for SK instance generation.
pub mod config;
mod energy;
mod sk;

pub use config::{SeedPolicy, SkConfig};
pub use energy::{brute_force_ground_state, ising_energy, GroundState, MAX_BRUTE_FORCE_SPINS};
pub use sk::{DiagonalPolicy, SherringtonKirkpatrick, SkInstance};
