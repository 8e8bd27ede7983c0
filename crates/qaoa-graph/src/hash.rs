use sha2::{Digest, Sha256};

use crate::weighted::WeightedGraph;

const HASH_DOMAIN: &[u8] = b"qaoa-weighted-graph:v1";

/// Computes the canonical structural hash for the provided graph.
///
/// The digest covers the node count and the sorted edge list, with weights
/// hashed through their IEEE-754 bit patterns.
pub fn canonical_hash(graph: &WeightedGraph) -> String {
    let mut hasher = Sha256::new();
    hasher.update(HASH_DOMAIN);
    hasher.update((graph.node_count() as u64).to_le_bytes());
    hasher.update((graph.edge_count() as u64).to_le_bytes());
    for edge in graph.edges() {
        hasher.update((edge.u as u64).to_le_bytes());
        hasher.update((edge.v as u64).to_le_bytes());
        hasher.update(normalized_bits(edge.weight).to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

fn normalized_bits(weight: f64) -> u64 {
    // -0.0 and 0.0 compare equal and must hash equal.
    if weight == 0.0 {
        0.0f64.to_bits()
    } else {
        weight.to_bits()
    }
}
