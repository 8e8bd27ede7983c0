#![deny(missing_docs)]
#![doc = include_str!("../docs/graph-api.md")]

//! Weighted problem graphs and the coupling matrices they are built from.

mod convert;
mod hash;
mod matrix;
mod serialization;
mod weighted;

pub use convert::graph_from_matrix;
pub use hash::canonical_hash;
pub use matrix::CouplingMatrix;
pub use serialization::{
    graph_from_bytes, graph_from_json, graph_to_bytes, graph_to_json, GRAPH_SCHEMA_VERSION,
};
pub use weighted::{WeightedEdge, WeightedGraph};
