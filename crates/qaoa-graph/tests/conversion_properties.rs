use proptest::prelude::*;
use qaoa_graph::{
    canonical_hash, graph_from_bytes, graph_from_json, graph_from_matrix, graph_to_bytes,
    graph_to_json, CouplingMatrix,
};

fn symmetric_matrix() -> impl Strategy<Value = CouplingMatrix> {
    (0usize..8).prop_flat_map(|dim| {
        prop::collection::vec(prop::sample::select(vec![-1.0, 0.0, 1.0, 0.5]), dim * dim).prop_map(
            move |raw| {
                let mut entries = vec![0.0; dim * dim];
                for i in 0..dim {
                    for j in 0..dim {
                        entries[i * dim + j] = if i <= j {
                            raw[i * dim + j]
                        } else {
                            entries[j * dim + i]
                        };
                    }
                }
                CouplingMatrix::from_row_major(dim, entries).unwrap()
            },
        )
    })
}

proptest! {
    #[test]
    fn conversion_round_trips(matrix in symmetric_matrix()) {
        let graph = graph_from_matrix(&matrix).unwrap();
        prop_assert_eq!(graph.node_count(), matrix.dim());

        let nonzero_upper = (0..matrix.dim())
            .flat_map(|i| (i..matrix.dim()).map(move |j| (i, j)))
            .filter(|&(i, j)| matrix[(i, j)] != 0.0)
            .count();
        prop_assert_eq!(graph.edge_count(), nonzero_upper);
        for edge in graph.edges() {
            prop_assert!(edge.u <= edge.v);
            prop_assert_eq!(edge.weight, matrix[(edge.u, edge.v)]);
        }
        prop_assert_eq!(graph.to_coupling_matrix(), matrix);
    }

    #[test]
    fn serialization_preserves_hash(matrix in symmetric_matrix()) {
        let graph = graph_from_matrix(&matrix).unwrap();
        let expected = canonical_hash(&graph);

        let bytes = graph_to_bytes(&graph).unwrap();
        let from_bytes = graph_from_bytes(&bytes).unwrap();
        prop_assert_eq!(canonical_hash(&from_bytes), expected.clone());

        let json = graph_to_json(&graph).unwrap();
        let from_json = graph_from_json(&json).unwrap();
        prop_assert_eq!(canonical_hash(&from_json), expected);
        prop_assert_eq!(from_json, graph);
    }
}

#[test]
fn rejects_future_schema_major() {
    let json = r#"{"schema_version":{"major":2,"minor":0,"patch":0},"graph":{"node_count":1,"edges":[]}}"#;
    let err = graph_from_json(json).unwrap_err();
    assert_eq!(err.code(), "schema-mismatch");
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = graph_from_json("{not json").unwrap_err();
    assert_eq!(err.code(), "deserialize-json");
}
