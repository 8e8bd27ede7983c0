use qaoa_core::errors::{ErrorInfo, QaoaError};
use tracing::trace;

use crate::matrix::CouplingMatrix;
use crate::weighted::WeightedGraph;

/// Converts a symmetric coupling matrix into a weighted graph.
///
/// Every nonzero entry `M[i][j]` with `i <= j` becomes the edge `{i, j}` with
/// weight `M[i][j]`; nonzero diagonal entries become self-loops. The graph has
/// one node per matrix row.
pub fn graph_from_matrix(matrix: &CouplingMatrix) -> Result<WeightedGraph, QaoaError> {
    if let Some((row, column)) = matrix.first_asymmetry() {
        return Err(QaoaError::Matrix(
            ErrorInfo::new("asymmetric-matrix", "coupling matrix must be symmetric")
                .with_context("row", row.to_string())
                .with_context("column", column.to_string())
                .with_hint("mirror the upper triangle into the lower triangle"),
        ));
    }

    let mut graph = WeightedGraph::new(matrix.dim());
    for (i, row) in matrix.as_matrix().row_iter().enumerate() {
        for (j, &weight) in row.iter().enumerate().skip(i) {
            if weight != 0.0 {
                graph.add_edge(i, j, weight)?;
            }
        }
    }
    trace!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "converted coupling matrix"
    );
    Ok(graph)
}
