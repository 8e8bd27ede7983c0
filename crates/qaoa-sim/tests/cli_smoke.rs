use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn qaoa_sim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qaoa-sim"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run qaoa-sim")
}

fn json_stdout(args: &[&str]) -> Value {
    let output = qaoa_sim(args);
    assert!(
        output.status.success(),
        "qaoa-sim {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

#[test]
fn sk_is_reproducible_with_a_seed() {
    let first = json_stdout(&["sk", "--nodes", "4", "--seed", "3"]);
    let second = json_stdout(&["sk", "--nodes", "4", "--seed", "3"]);
    assert_eq!(first, second);
    assert_eq!(first["graph"]["node_count"], 4);
    assert_eq!(first["graph"]["edges"].as_array().unwrap().len(), 10);
    assert_eq!(first["matrix"].as_array().unwrap().len(), 4);
    assert_eq!(first["provenance"]["producer"], "sherrington-kirkpatrick");
    assert_eq!(first["provenance"]["graph_hash"].as_str().unwrap().len(), 64);
}

#[test]
fn sk_batch_without_diagonal() {
    let batch = json_stdout(&[
        "sk",
        "--nodes",
        "5",
        "--seed",
        "1",
        "--zero-diagonal",
        "--count",
        "3",
    ]);
    let documents = batch.as_array().unwrap();
    assert_eq!(documents.len(), 3);
    for (index, document) in documents.iter().enumerate() {
        assert_eq!(document["diagonal"], "zero");
        assert_eq!(document["graph"]["edges"].as_array().unwrap().len(), 10);
        assert_eq!(document["provenance"]["substream"], index as u64);
    }
    assert_ne!(
        documents[0]["provenance"]["graph_hash"],
        documents[1]["provenance"]["graph_hash"]
    );
}

#[test]
fn sk_reads_config_and_writes_file() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("batch.yaml");
    fs::write(
        &config,
        "node_num: 3\ninstances: 2\nseed_policy:\n  master_seed: 8\n  label: tiny\n",
    )
    .unwrap();
    let out = dir.path().join("nested").join("instances.json");

    let output = qaoa_sim(&[
        "sk",
        "--config",
        config.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let documents = written.as_array().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["label"], "tiny");
    assert_eq!(documents[0]["node_num"], 3);
}

#[test]
fn ground_state_reports_energy() {
    let document = json_stdout(&["ground-state", "--nodes", "6", "--seed", "4", "--zero-diagonal"]);
    let spins = document["ground_state"]["spins"].as_array().unwrap();
    assert_eq!(spins.len(), 6);
    assert_eq!(spins[0], 1);
    assert!(document["ground_state"]["energy"].as_f64().unwrap() <= 0.0);
}

#[test]
fn optimize_sphere_within_budget() {
    let document = json_stdout(&[
        "optimize",
        "--objective",
        "sphere",
        "--depth",
        "2",
        "--seed",
        "5",
        "--maxiter",
        "30",
    ]);
    let result = &document["result"];
    assert_eq!(result["x"].as_array().unwrap().len(), 4);
    assert!(result["nfev"].as_u64().unwrap() <= 30);
    assert!(result["fun"].as_f64().unwrap() < 0.05);
    assert_eq!(document["config"]["maxiter"], 30);
}

#[test]
fn optimize_accepts_negative_initial_point() {
    let document = json_stdout(&[
        "optimize",
        "--objective",
        "rosenbrock",
        "--initial-point",
        "-1.2,1.0",
        "--maxiter",
        "200",
        "--disp",
    ]);
    assert!(document["result"]["fun"].as_f64().unwrap() < 24.2);
}

#[test]
fn optimize_rejects_mismatched_initial_point() {
    let output = qaoa_sim(&[
        "optimize",
        "--objective",
        "sphere",
        "--depth",
        "2",
        "--initial-point",
        "0.1,0.2",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("dimension-mismatch"));
}

#[test]
fn version_prints_package_version() {
    let output = qaoa_sim(&["version"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), env!("CARGO_PKG_VERSION"));
}
