//! layerlapse CLI
//!
//! Command-line interface for planning build-up exports and scanning for
//! documents that need one

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use layerlapse_core::logging_facility::{init, Profile};
use layerlapse_core::ExportConfig;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "layerlapse")]
#[command(about = "layerlapse - Build-up timelapse frames from layered documents", long_about = None)]
struct Cli {
    /// TOML export configuration (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Human-readable debug logging instead of JSON
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Dry-run an export against a JSON layer description
    Plan(commands::plan::PlanArgs),
    /// List documents under a path and whether they need export
    Scan(commands::scan::ScanArgs),
}

fn load_config(path: Option<&PathBuf>) -> Result<ExportConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ExportConfig::load(path)?),
        None => Ok(ExportConfig::default()),
    }
}

fn main() {
    let cli = Cli::parse();
    init(if cli.verbose {
        Profile::Development
    } else {
        Profile::Production
    });

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Commands::Plan(args) => commands::plan::execute(args, config),
        Commands::Scan(args) => commands::scan::execute(args, &config),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
