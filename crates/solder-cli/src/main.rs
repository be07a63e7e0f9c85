//! Host command line for the Solder dynamic symbol loader.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use solder_core::{LibraryTarget, OpenMode, SymbolLoader};

/// Solder - inspect shared objects and the process symbol table.
#[derive(Parser, Debug)]
#[command(name = "solder")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Emit machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Open a shared object and resolve the given symbols.
    Inspect {
        /// Path or soname of the shared object.
        path: PathBuf,
        /// Symbol names to resolve.
        #[arg(required = true)]
        symbols: Vec<String>,
        /// Resolution mode: eager or lazy.
        #[arg(short, long, default_value = "lazy")]
        mode: String,
    },
    /// Resolve symbols against the current process's own symbol table.
    ProbeSelf {
        /// Symbol names to resolve (defaults to malloc, printf, free).
        symbols: Vec<String>,
        /// Resolution mode: eager or lazy.
        #[arg(short, long, default_value = "lazy")]
        mode: String,
    },
    /// List loadable shared objects in a directory without opening them.
    Discover {
        /// Directory to scan.
        dir: PathBuf,
    },
}

/// One resolved symbol as reported to the user.
#[derive(Serialize)]
struct SymbolReport {
    name: String,
    address: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Inspect {
            path,
            symbols,
            mode,
        } => inspect(LibraryTarget::path(path), &symbols, &mode, args.json),
        Command::ProbeSelf { symbols, mode } => {
            // The classic demo trio when nothing is asked for explicitly.
            let symbols = if symbols.is_empty() {
                vec![
                    "malloc".to_string(),
                    "printf".to_string(),
                    "free".to_string(),
                ]
            } else {
                symbols
            };
            inspect(LibraryTarget::SelfProcess, &symbols, &mode, args.json)
        }
        Command::Discover { dir } => discover(&dir, args.json),
    }
}

/// Open the target, resolve every requested symbol, report addresses.
fn inspect(target: LibraryTarget, symbols: &[String], mode: &str, json: bool) -> Result<()> {
    let mode = parse_mode(mode)?;
    let mut loader = SymbolLoader::with_mode(mode);
    let mut handle = loader.open_with_mode(target, mode)?;

    let mut reports = Vec::with_capacity(symbols.len());
    for name in symbols {
        let symbol = handle.resolve(name)?;
        reports.push(SymbolReport {
            name: symbol.name().to_string(),
            address: format!("{:p}", symbol.addr()),
        });
    }

    handle.close()?;
    tracing::debug!(count = reports.len(), "resolved all requested symbols");

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{:<28} {}", report.name, report.address);
        }
    }
    Ok(())
}

/// List shared objects in a directory.
fn discover(dir: &Path, json: bool) -> Result<()> {
    let loader = SymbolLoader::new();
    let found = loader.discover(dir);

    if json {
        let paths: Vec<String> = found.iter().map(|p| p.display().to_string()).collect();
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else if found.is_empty() {
        println!("no shared objects in {}", dir.display());
    } else {
        for path in &found {
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn parse_mode(s: &str) -> Result<OpenMode> {
    match OpenMode::from_str(s) {
        Some(mode) => Ok(mode),
        None => bail!("unknown mode {:?} (expected \"eager\" or \"lazy\")", s),
    }
}

/// Initialize logging.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // JSON logs for container environments, compact text otherwise.
    let json_logging = std::env::var("SOLDER_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init();
    }
}
