//! Steward command-line entry point.
//!
//! The binary is the composition root: it loads configuration, builds
//! the registry, drift monitor, collector, and engine explicitly, and
//! passes them by reference. No component is a process-wide singleton.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod replay;

#[derive(Parser)]
#[command(
    name = "steward",
    version,
    about = "SRE agent core: bounded Think-Act-Observe reasoning over cluster tools"
)]
struct Cli {
    /// Path to steward.toml
    #[arg(long, global = true, env = "STEWARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered tools
    Tools {
        /// Print the full JSON schemas instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Search the knowledge base directly
    Kb {
        /// The search query
        query: String,

        /// Number of results to return
        #[arg(long, default_value_t = 3)]
        top_k: u64,
    },

    /// Drive the reasoning loop from a scripted generator transcript
    Replay {
        /// JSON file containing an array of raw generator outputs
        transcript: PathBuf,

        /// The user query to process
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = steward_config::AppConfig::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.log);

    match cli.command {
        Commands::Tools { json } => commands::tools(json),
        Commands::Kb { query, top_k } => commands::kb(&query, top_k).await,
        Commands::Replay { transcript, query } => {
            commands::replay(&config, &transcript, &query).await
        }
    }
}

fn init_tracing(log: &steward_config::LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
