//! onsem command-line tool
//!
//! Validates bridge configuration files and runs a scripted conversation
//! through the boundary entry points.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "onsem")]
#[command(about = "Semantic engine bridge toolbox", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a bridge configuration file
    CheckConfig {
        /// Path to the TOML file
        path: PathBuf,
        /// Print the configuration with every default filled in
        #[arg(long)]
        resolved: bool,
    },

    /// Run a scripted conversation against the reference engine
    Demo {
        /// Bridge configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::CheckConfig { path, resolved } => commands::check_config::execute(&path, resolved),
        Commands::Demo { config } => commands::demo::execute(config.as_deref()),
    }
}
