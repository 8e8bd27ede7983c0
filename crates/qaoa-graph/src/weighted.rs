use std::ops::Range;

use nalgebra::DMatrix;
use qaoa_core::errors::{ErrorInfo, QaoaError};
use serde::{Deserialize, Serialize};

use crate::matrix::CouplingMatrix;

/// Undirected weighted edge with endpoints stored as `u <= v`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEdge {
    /// Smaller endpoint.
    pub u: usize,
    /// Larger endpoint (equal to `u` for a self-loop).
    pub v: usize,
    /// Coupling strength carried by the edge.
    pub weight: f64,
}

impl WeightedEdge {
    /// Returns `true` when both endpoints coincide.
    pub fn is_self_loop(&self) -> bool {
        self.u == self.v
    }

    fn key(&self) -> (usize, usize) {
        (self.u, self.v)
    }
}

/// Undirected weighted graph over nodes `0..node_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphRepr")]
pub struct WeightedGraph {
    node_count: usize,
    edges: Vec<WeightedEdge>,
}

#[derive(Deserialize)]
struct GraphRepr {
    node_count: usize,
    edges: Vec<WeightedEdge>,
}

impl TryFrom<GraphRepr> for WeightedGraph {
    type Error = QaoaError;

    fn try_from(repr: GraphRepr) -> Result<Self, Self::Error> {
        let mut graph = WeightedGraph::new(repr.node_count);
        for edge in repr.edges {
            graph.add_edge(edge.u, edge.v, edge.weight)?;
        }
        Ok(graph)
    }
}

impl WeightedGraph {
    /// Creates a graph with `node_count` isolated nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edges: Vec::new(),
        }
    }

    /// Adds the undirected edge `{u, v}`; endpoints may be given in either order.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: f64) -> Result<(), QaoaError> {
        for node in [u, v] {
            if node >= self.node_count {
                return Err(QaoaError::Graph(
                    ErrorInfo::new("node-out-of-range", "edge endpoint is not a graph node")
                        .with_context("node", node.to_string())
                        .with_context("node_count", self.node_count.to_string()),
                ));
            }
        }
        if !weight.is_finite() {
            return Err(QaoaError::Graph(
                ErrorInfo::new("non-finite-weight", "edge weights must be finite")
                    .with_context("u", u.to_string())
                    .with_context("v", v.to_string()),
            ));
        }
        let edge = WeightedEdge {
            u: u.min(v),
            v: u.max(v),
            weight,
        };
        match self.edges.binary_search_by_key(&edge.key(), WeightedEdge::key) {
            Ok(_) => Err(QaoaError::Graph(
                ErrorInfo::new("duplicate-edge", "edge already present")
                    .with_context("u", edge.u.to_string())
                    .with_context("v", edge.v.to_string()),
            )),
            Err(position) => {
                self.edges.insert(position, edge);
                Ok(())
            }
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of edges, self-loops included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node identifiers.
    pub fn nodes(&self) -> Range<usize> {
        0..self.node_count
    }

    /// Edges sorted by `(u, v)`.
    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    /// Weight of edge `{u, v}` if present.
    pub fn weight(&self, u: usize, v: usize) -> Option<f64> {
        let key = (u.min(v), u.max(v));
        self.edges
            .binary_search_by_key(&key, WeightedEdge::key)
            .ok()
            .map(|index| self.edges[index].weight)
    }

    /// Neighbours of `node` other than itself, with the connecting weight.
    pub fn neighbors(&self, node: usize) -> Vec<(usize, f64)> {
        self.edges
            .iter()
            .filter(|edge| !edge.is_self_loop())
            .filter_map(|edge| {
                if edge.u == node {
                    Some((edge.v, edge.weight))
                } else if edge.v == node {
                    Some((edge.u, edge.weight))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Number of distinct neighbours of `node`.
    pub fn degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }

    /// Iterates over self-loop edges.
    pub fn self_loops(&self) -> impl Iterator<Item = &WeightedEdge> + '_ {
        self.edges.iter().filter(|edge| edge.is_self_loop())
    }

    /// Returns `true` when at least one node couples to itself.
    pub fn has_self_loops(&self) -> bool {
        self.self_loops().next().is_some()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|edge| edge.weight).sum()
    }

    /// Rebuilds the symmetric coupling matrix encoded by this graph.
    pub fn to_coupling_matrix(&self) -> CouplingMatrix {
        let dim = self.node_count;
        let mut entries = DMatrix::<f64>::zeros(dim, dim);
        for edge in &self.edges {
            entries[(edge.u, edge.v)] = edge.weight;
            entries[(edge.v, edge.u)] = edge.weight;
        }
        // Edge weights are finite by construction.
        CouplingMatrix::from_trusted(entries)
    }
}
