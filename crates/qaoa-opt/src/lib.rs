#![deny(missing_docs)]
#![doc = include_str!("../docs/opt-api.md")]

pub mod cobyla;
mod config;
pub mod objectives;
mod optimizer;

pub use cobyla::{minimize, CobylaOptions, Constraint};
pub use config::{CobylaConfig, DEFAULT_RHOEND};
pub use optimizer::Cobyla;
