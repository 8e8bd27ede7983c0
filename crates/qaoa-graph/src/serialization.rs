use qaoa_core::errors::{ErrorInfo, QaoaError};
use qaoa_core::provenance::SchemaVersion;
use serde::{Deserialize, Serialize};

use crate::weighted::WeightedGraph;

/// Schema version written alongside serialized graphs.
pub const GRAPH_SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Serializes the graph to a compact binary representation using `bincode`.
pub fn graph_to_bytes(graph: &WeightedGraph) -> Result<Vec<u8>, QaoaError> {
    bincode::serialize(&GraphDocument::borrowed(graph))
        .map_err(|err| QaoaError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a graph from its binary representation.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<WeightedGraph, QaoaError> {
    let document: OwnedGraphDocument = bincode::deserialize(bytes)
        .map_err(|err| QaoaError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    document.into_graph()
}

/// Serializes the graph to a JSON string.
pub fn graph_to_json(graph: &WeightedGraph) -> Result<String, QaoaError> {
    serde_json::to_string_pretty(&GraphDocument::borrowed(graph))
        .map_err(|err| QaoaError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a graph from a JSON string.
pub fn graph_from_json(json: &str) -> Result<WeightedGraph, QaoaError> {
    let document: OwnedGraphDocument = serde_json::from_str(json)
        .map_err(|err| QaoaError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    document.into_graph()
}

#[derive(Debug, Serialize)]
struct GraphDocument<'a> {
    schema_version: SchemaVersion,
    graph: &'a WeightedGraph,
}

impl<'a> GraphDocument<'a> {
    fn borrowed(graph: &'a WeightedGraph) -> Self {
        Self {
            schema_version: GRAPH_SCHEMA_VERSION,
            graph,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwnedGraphDocument {
    schema_version: SchemaVersion,
    graph: WeightedGraph,
}

impl OwnedGraphDocument {
    fn into_graph(self) -> Result<WeightedGraph, QaoaError> {
        if self.schema_version.major != GRAPH_SCHEMA_VERSION.major {
            return Err(QaoaError::Serde(
                ErrorInfo::new("schema-mismatch", "unsupported graph schema version")
                    .with_context(
                        "found",
                        format!(
                            "{}.{}.{}",
                            self.schema_version.major,
                            self.schema_version.minor,
                            self.schema_version.patch
                        ),
                    )
                    .with_context("expected_major", GRAPH_SCHEMA_VERSION.major.to_string()),
            ));
        }
        Ok(self.graph)
    }
}
