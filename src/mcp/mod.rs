//! @acp:module "MCP Server"
//! @acp:summary "Model Context Protocol server for question selection"
//! @acp:domain daemon
//! @acp:layer transport
//!
//! Serves the selection engine over stdio so the test-creation layer can
//! request question lists without linking the engine directly.

mod service;
mod tools;

pub use service::QSelectMcpService;

use rmcp::ServiceExt;
use std::path::Path;
use tokio::io::{stdin, stdout};
use tracing::{error, info};

use crate::state::AppState;

/// Run the MCP server over stdio
pub async fn run_stdio_server(data_dir: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    info!("Starting MCP server over stdio");

    // Load config, catalog and history
    let state = AppState::load(data_dir, config_path).await?;

    {
        let config = state.engine().config();
        info!(
            "Selection config: exclusion window {}, ratios {}/{}/{}, adaptive {}",
            config.recent_exclusion_window,
            config.adaptive_ratios.new,
            config.adaptive_ratios.wrong,
            config.adaptive_ratios.correct,
            if config.adaptive_selection_enabled { "enabled" } else { "disabled" }
        );
    }

    // Create MCP service
    let service = QSelectMcpService::new(state);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Serve MCP protocol
    info!("MCP server ready, waiting for requests...");
    match service.serve(transport).await {
        Ok(server) => {
            server.waiting().await?;
            info!("MCP server shutdown");
        }
        Err(e) => {
            error!("MCP server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
