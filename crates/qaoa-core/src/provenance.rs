//! Provenance and schema descriptors attached to serialized artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to every emitted instance or result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Name of the generator or optimizer that produced the artifact.
    pub producer: String,
    /// Canonical hash of the graph the artifact refers to (empty when not applicable).
    pub graph_hash: String,
    /// Seed used for all randomness, when the run was seeded.
    pub seed: Option<u64>,
    /// Substream index within a batch, when the artifact is part of one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substream: Option<u64>,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}
