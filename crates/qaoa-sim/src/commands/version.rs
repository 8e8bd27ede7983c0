use std::collections::BTreeMap;
use std::error::Error;
use std::process::Command;

use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Emit extended metadata including toolchain information.
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: String,
    rustc: String,
    components: BTreeMap<&'static str, &'static str>,
    graph_schema: String,
}

pub fn run(args: &VersionArgs) -> Result<(), Box<dyn Error>> {
    if !args.long {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let schema = qaoa_graph::GRAPH_SCHEMA_VERSION;
    let info = VersionInfo {
        version: env!("CARGO_PKG_VERSION").into(),
        rustc: rustc_version(),
        components: BTreeMap::from([
            ("optimizer", "cobyla"),
            ("generator", "sherrington-kirkpatrick"),
        ]),
        graph_schema: format!("{}.{}.{}", schema.major, schema.minor, schema.patch),
    };
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn rustc_version() -> String {
    Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| {
            if out.status.success() {
                Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| "rustc unavailable".into())
}
