//! fieldstore CLI
//!
//! Command-line tools for stored-field segment files.
//!
//! # Commands
//!
//! - `inspect` - Display file sizes, document count and record layout
//! - `verify` - Decode every record and check the index against the data
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use commands::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// fieldstore command-line segment tools.
#[derive(Parser)]
#[command(name = "fieldstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the segment directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Segment name (files are <segment>.fdt and <segment>.fdx)
    #[arg(global = true, short, long, default_value = "_0")]
    segment: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display segment sizes and document layout
    Inspect {
        /// Show the offset and length of every document
        #[arg(short, long)]
        documents: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify stored-field integrity
    Verify {
        /// Print every decoded field
        #[arg(long)]
        fields: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { documents, format } => {
            let path = cli.path.ok_or("Segment directory path required for inspect")?;
            let format: OutputFormat = format.parse()?;
            commands::inspect::run(&path, &cli.segment, documents, format)?;
        }
        Commands::Verify { fields } => {
            let path = cli.path.ok_or("Segment directory path required for verify")?;
            commands::verify::run(&path, &cli.segment, fields)?;
        }
        Commands::Version => {
            println!("fieldstore CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("fieldstore core v{}", fieldstore_core::VERSION);
        }
    }

    Ok(())
}
