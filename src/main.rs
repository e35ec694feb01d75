#![forbid(unsafe_code)]

//! @acp:module "QSelect MCP Server Entry Point"
//! @acp:summary "Main entry point for the question selection server"
//! @acp:domain mcp
//! @acp:layer application
//!
//! Chooses the questions of new test-preparation sessions: recent questions are
//! avoided, adaptive tests lean toward a student's weak spots, and every
//! selection has exactly the requested size or a structured insufficiency error.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod mcp;
mod selection;
mod state;

/// QSelect MCP Server - question selection for test sessions
#[derive(Parser, Debug)]
#[command(name = "qselect-mcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data directory containing catalog.json and sessions.json
    #[arg(long, short = 'C')]
    directory: Option<PathBuf>,

    /// Selection config file (default: <directory>/selection.config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging (to stderr so stdout is free for MCP)
    init_logging(&cli.log_level);

    let data_dir = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    info!("QSelect MCP Server starting");
    info!("Data directory: {}", data_dir.display());

    // Run MCP server over stdio
    mcp::run_stdio_server(&data_dir, cli.config.as_deref()).await
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
