mod replay;
mod script;
mod sim;

use script::Script;
use std::env;
use std::fs;
use std::path::Path;
use std::process;
use tma_infra_storage_fs::FsStorage;
use tma_ports::storage::StoragePort;

const USAGE: &str = "Usage: tma-replay [--settings] [--verbose] <script.json> [report.json]";

fn main() {
    let mut use_settings = false;
    let mut verbose = false;
    let mut positional = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--settings" => use_settings = true,
            "--verbose" => verbose = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return;
            }
            _ => positional.push(arg),
        }
    }

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let Some(input_path) = positional.first() else {
        eprintln!("{USAGE}");
        process::exit(1);
    };
    let output_path = positional.get(1);

    let script = match Script::load(Path::new(input_path)) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("Error loading script '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    let storage = use_settings.then(|| Box::new(FsStorage::default()) as Box<dyn StoragePort>);
    let report = match replay::run(&script, storage) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Replay failed: {}", e);
            process::exit(1);
        }
    };
    if let Some(warning) = report.teardown_warning.as_deref() {
        eprintln!("Warning: {}", warning);
    }

    let json = match serde_json::to_string_pretty(&report) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error encoding report: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote replay report to {}", path);
        }
        None => {
            println!("{}", json);
        }
    }
}
