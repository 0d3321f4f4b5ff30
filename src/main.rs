//! cellgraph-demo - walk through edits on a small reactive sheet.

use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use cellgraph::{SheetConfig, Spreadsheet, demo};

fn print_usage() {
    eprintln!("Usage: cellgraph-demo [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --config <FILE>    Load sheet settings from a TOML file");
    eprintln!("  -h, --help             Print help");
    eprintln!();
    eprintln!("Set RUST_LOG=debug (or trace) to follow edits and recalculation.");
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config_file: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            arg => {
                eprintln!("Error: Unknown argument: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match &config_file {
        Some(path) => SheetConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SheetConfig::default(),
    };
    log::debug!("using {config:?}");

    let mut sheet = Spreadsheet::with_config(config);
    demo::run(&mut sheet, &mut io::stdout().lock())
}
