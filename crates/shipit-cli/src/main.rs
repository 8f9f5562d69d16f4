mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shipit",
    about = "Package a committed build and its assets into a deployable zip"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the current commit and package it as <commit>.zip in this directory
    Package {
        /// Stream build script output instead of discarding it
        #[arg(long)]
        show_build_output: bool,
        /// Print the result as JSON
        #[arg(long, conflicts_with = "show_build_output")]
        json: bool,
    },
    /// List the entries of an archive
    Inspect {
        /// Path to a .zip produced by `shipit package`
        archive: PathBuf,
    },
    /// Check that the source tree is ready to package
    Doctor,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Package {
            show_build_output,
            json,
        } => commands::package(show_build_output, json)?,
        Commands::Inspect { archive } => commands::inspect(&archive)?,
        Commands::Doctor => commands::doctor()?,
    }

    Ok(())
}
