//! CLI tool that parses a JavaScript file and prints its ESTree JSON
//!
//! Usage: esfront [options] <file.js>
//!
//! Options:
//!   --module             Parse as an ES module
//!   --strict             Parse script code as strict
//!   --no-legacy          Disable the Annex B sloppy-mode relaxations
//!   --loc                Include line/column locations
//!   --no-ranges          Omit start/end offsets
//!   --options <file>     Load options from a JSON file; flags override it
//!
//! Set RUST_LOG=esfront=debug to trace parsing.

use std::env;
use std::fs;
use std::path::PathBuf;

use esfront::{ParseOptions, parse_to_estree};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// CLI configuration
struct Config {
    path: PathBuf,
    options: ParseOptions,
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map_or("esfront", |s| s.as_str());

    let mut options_file: Option<&str> = None;
    let mut flags: Vec<&str> = Vec::new();
    let mut path_arg: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args.get(i) else {
            break;
        };
        match arg.as_str() {
            "--options" => {
                i += 1;
                options_file = Some(
                    args.get(i)
                        .ok_or_else(|| "--options requires a file".to_string())?
                        .as_str(),
                );
            }
            "--module" | "--strict" | "--no-legacy" | "--loc" | "--no-ranges" => flags.push(arg),
            _ if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            _ => path_arg = Some(arg),
        }
        i += 1;
    }

    let path_arg = path_arg.ok_or_else(|| {
        format!(
            "Usage: {} [--module] [--strict] [--no-legacy] [--loc] [--no-ranges] [--options <file.json>] <file.js>",
            program_name
        )
    })?;

    let mut options = match options_file {
        Some(file) => {
            let text = fs::read_to_string(file).map_err(|e| format!("Cannot read {}: {}", file, e))?;
            serde_json::from_str(&text).map_err(|e| format!("Invalid options in {}: {}", file, e))?
        }
        None => ParseOptions::default(),
    };

    for flag in flags {
        options = match flag {
            "--module" => options.with_module(true),
            "--strict" => options.with_strict(true),
            "--no-legacy" => options.with_disable_legacy_compat(true),
            "--loc" => options.with_loc(true),
            _ => options.with_ranges(false),
        };
    }

    Ok(Config {
        path: PathBuf::from(path_arg),
        options,
    })
}

fn run() -> Result<(), String> {
    let config = parse_args()?;
    let source = fs::read_to_string(&config.path)
        .map_err(|e| format!("Cannot read {}: {}", config.path.display(), e))?;

    let tree = parse_to_estree(&source, &config.options)
        .map_err(|e| format!("{}: {}", config.path.display(), e))?;

    let json = serde_json::to_string_pretty(&tree).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}
