use std::fs;

use qaoa_apps::{DiagonalPolicy, SkConfig};
use qaoa_graph::canonical_hash;
use tempfile::tempdir;

#[test]
fn loads_batch_from_yaml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sk.yaml");
    fs::write(
        &path,
        "node_num: 6\ndiagonal: zero\ninstances: 4\nseed_policy:\n  master_seed: 99\n  label: smoke\n",
    )
    .unwrap();

    let config = SkConfig::load(&path).unwrap();
    assert_eq!(config.node_num, 6);
    assert_eq!(config.diagonal, DiagonalPolicy::Zero);
    assert_eq!(config.seed_policy.label.as_deref(), Some("smoke"));

    let hashes: Vec<String> = (0..config.instances)
        .map(|index| {
            let graph = config.generator().run(&mut config.instance_rng(index)).unwrap();
            assert_eq!(graph.edge_count(), 15);
            canonical_hash(&graph)
        })
        .collect();
    let again = config
        .generator()
        .run(&mut config.instance_rng(2))
        .unwrap();
    assert_eq!(canonical_hash(&again), hashes[2]);
    assert_ne!(hashes[0], hashes[1]);
}

#[test]
fn yaml_round_trips() {
    let config = SkConfig {
        node_num: 9,
        ..SkConfig::default()
    };
    let text = config.to_yaml_string().unwrap();
    assert_eq!(SkConfig::from_yaml_str(&text).unwrap(), config);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = SkConfig::load(&path).unwrap_err();
    assert_eq!(err.code(), "config-read");
    assert!(err.info().context["path"].ends_with("absent.yaml"));
}

#[test]
fn parse_errors_carry_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "node_num: -3\n").unwrap();
    let err = SkConfig::load(&path).unwrap_err();
    assert_eq!(err.code(), "config-parse");
    assert!(err.info().context.contains_key("path"));
}
