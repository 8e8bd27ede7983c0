use qaoa_core::errors::{ErrorInfo, QaoaError};
use qaoa_graph::WeightedGraph;
use serde::{Deserialize, Serialize};

/// Largest instance [`brute_force_ground_state`] accepts.
pub const MAX_BRUTE_FORCE_SPINS: usize = 24;

/// Exact minimum-energy configuration of a small instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundState {
    /// Spin configuration (±1 per node, spin 0 fixed to +1).
    pub spins: Vec<i8>,
    /// Ising energy of [`GroundState::spins`].
    pub energy: f64,
    /// Number of configurations with spin 0 = +1 reaching the minimum.
    pub degeneracy: usize,
}

/// Evaluates `E(s) = Σ w_uv s_u s_v` over the edges of `graph`.
///
/// Self-loops contribute their weight unchanged since `s_u² = 1`.
pub fn ising_energy(graph: &WeightedGraph, spins: &[i8]) -> Result<f64, QaoaError> {
    if spins.len() != graph.node_count() {
        return Err(QaoaError::Graph(
            ErrorInfo::new("spin-count-mismatch", "one spin per node is required")
                .with_context("spins", spins.len().to_string())
                .with_context("nodes", graph.node_count().to_string()),
        ));
    }
    if let Some(index) = spins.iter().position(|&s| s != 1 && s != -1) {
        return Err(QaoaError::Graph(
            ErrorInfo::new("invalid-spin", "spins must be +1 or -1")
                .with_context("index", index.to_string())
                .with_context("value", spins[index].to_string()),
        ));
    }
    Ok(graph
        .edges()
        .iter()
        .map(|edge| edge.weight * f64::from(spins[edge.u]) * f64::from(spins[edge.v]))
        .sum())
}

/// Finds the exact ground state by enumerating all configurations.
///
/// Energies are invariant under a global spin flip, so spin 0 is pinned to +1
/// and the remaining `2^(N-1)` configurations are visited in Gray-code order.
/// Ties are resolved towards the lexicographically smallest spin vector.
pub fn brute_force_ground_state(graph: &WeightedGraph) -> Result<GroundState, QaoaError> {
    let n = graph.node_count();
    if n > MAX_BRUTE_FORCE_SPINS {
        return Err(QaoaError::Graph(
            ErrorInfo::new("too-many-spins", "instance too large for exhaustive search")
                .with_context("nodes", n.to_string())
                .with_context("max", MAX_BRUTE_FORCE_SPINS.to_string())
                .with_hint("use a variational optimizer for larger instances"),
        ));
    }
    if n == 0 {
        return Ok(GroundState {
            spins: Vec::new(),
            energy: 0.0,
            degeneracy: 1,
        });
    }

    let neighbors: Vec<Vec<(usize, f64)>> = graph.nodes().map(|u| graph.neighbors(u)).collect();
    let mut spins = vec![1i8; n];
    let mut energy = ising_energy(graph, &spins)?;
    let mut best = spins.clone();
    let mut best_energy = energy;
    let mut degeneracy = 1usize;

    let configurations = 1u64 << (n - 1);
    for step in 1..configurations {
        // Gray code: flip spin (1 + index of lowest set bit).
        let flip = 1 + step.trailing_zeros() as usize;
        let local: f64 = neighbors[flip]
            .iter()
            .map(|&(other, weight)| weight * f64::from(spins[other]))
            .sum();
        energy -= 2.0 * f64::from(spins[flip]) * local;
        spins[flip] = -spins[flip];

        let tolerance = 1e-9 * (1.0 + best_energy.abs());
        if energy < best_energy - tolerance {
            best_energy = energy;
            best.copy_from_slice(&spins);
            degeneracy = 1;
        } else if (energy - best_energy).abs() <= tolerance {
            degeneracy += 1;
            if spins < best {
                best.copy_from_slice(&spins);
            }
        }
    }

    let energy = ising_energy(graph, &best)?;
    Ok(GroundState {
        spins: best,
        energy,
        degeneracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn antiferro_triangle() -> WeightedGraph {
        let mut graph = WeightedGraph::new(3);
        graph.add_edge(0, 1, 1.0).unwrap();
        graph.add_edge(1, 2, 1.0).unwrap();
        graph.add_edge(0, 2, 1.0).unwrap();
        graph
    }

    #[test]
    fn energy_of_aligned_spins_is_total_weight() {
        let graph = antiferro_triangle();
        assert_eq!(ising_energy(&graph, &[1, 1, 1]).unwrap(), 3.0);
        assert_eq!(ising_energy(&graph, &[1, -1, 1]).unwrap(), -1.0);
    }

    #[test]
    fn energy_validates_input() {
        let graph = antiferro_triangle();
        assert_eq!(ising_energy(&graph, &[1, 1]).unwrap_err().code(), "spin-count-mismatch");
        assert_eq!(ising_energy(&graph, &[1, 0, 1]).unwrap_err().code(), "invalid-spin");
    }

    #[test]
    fn frustrated_triangle_is_degenerate() {
        let ground = brute_force_ground_state(&antiferro_triangle()).unwrap();
        assert_eq!(ground.energy, -1.0);
        assert_eq!(ground.degeneracy, 3);
        assert_eq!(ground.spins, vec![1, -1, -1]);
    }

    #[test]
    fn self_loops_shift_energy() {
        let mut graph = antiferro_triangle();
        graph.add_edge(1, 1, -1.0).unwrap();
        let ground = brute_force_ground_state(&graph).unwrap();
        assert_eq!(ground.energy, -2.0);
    }

    #[test]
    fn rejects_large_instances() {
        let graph = WeightedGraph::new(MAX_BRUTE_FORCE_SPINS + 1);
        let err = brute_force_ground_state(&graph).unwrap_err();
        assert_eq!(err.code(), "too-many-spins");
    }

    #[test]
    fn empty_graph_has_zero_energy() {
        let ground = brute_force_ground_state(&WeightedGraph::new(0)).unwrap();
        assert!(ground.spins.is_empty());
        assert_eq!(ground.energy, 0.0);
    }
}
