//! cal-gateway: Calendar Assistant Gateway Main Binary
//!
//! Main entry point for the calendar assistant application.
//!
//! Usage:
//!   cal-gateway           - Start the HTTP API server
//!   cal-gateway --help    - Show help

use std::sync::Arc;

use cal_core::{Config, LlmClient, SessionManager, ToolManager};
use cal_google::{CalendarClient, SearchService, TasksClient, TokenProvider};
use cal_tools::register_default_tools;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Server mode (HTTP API)
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let mode = parse_args();

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("cal-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration (TOML file if present, then env overrides)
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting cal-gateway...");
    tracing::info!("Model: {}", config.llm.model);
    tracing::info!("Calendar: {}", config.google.calendar_id);

    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("cal-gateway - Calendar Assistant Gateway");
    println!();
    println!("Usage:");
    println!("  cal-gateway           Start the HTTP API server");
    println!("  cal-gateway --help    Show this help message");
    println!("  cal-gateway --version Show version");
    println!();
    println!("Environment Variables:");
    println!("  LLM_API_KEY           API key (required)");
    println!("  LLM_MODEL             Model name (default: claude-sonnet-4-20250514)");
    println!("  LLM_PROVIDER          Provider: claude or openai (default: claude)");
    println!("  LLM_BASE_URL          Custom API endpoint");
    println!("  API_PORT              HTTP API port (default: 5000)");
    println!("  GOOGLE_CALENDAR_ID    Calendar container id (default: primary)");
    println!("  GOOGLE_TASKLIST_ID    Task list id (default: @default)");
    println!("  GOOGLE_TOKEN_PATH     OAuth token file (default: token.json)");
    println!("  DB_PATH               Session database path");
}

/// Run server mode (HTTP API)
async fn run_server(config: Config) -> anyhow::Result<()> {
    // Create LLM client
    let llm = Arc::new(
        LlmClient::new(&config).map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?,
    );

    // Load the stored OAuth credential
    let auth = Arc::new(
        TokenProvider::from_file(&config.google.token_path)
            .map_err(|e| anyhow::anyhow!("Failed to load token file: {}", e))?,
    );

    // Build the Google gateways
    let calendar = Arc::new(
        CalendarClient::new(Arc::clone(&auth), config.google.calendar_id.clone())
            .map_err(|e| anyhow::anyhow!("Failed to create calendar client: {}", e))?,
    );
    let tasks = Arc::new(
        TasksClient::new(Arc::clone(&auth), config.google.tasklist_id.clone())
            .map_err(|e| anyhow::anyhow!("Failed to create tasks client: {}", e))?,
    );
    let search = Arc::new(SearchService::new(Arc::clone(&calendar), Arc::clone(&tasks)));

    // Initialize tool manager
    let mut tool_manager = ToolManager::new();
    register_default_tools(&mut tool_manager, calendar, tasks, search);
    tracing::info!(
        "Registered {} tools: {:?}",
        tool_manager.len(),
        tool_manager.tool_names()
    );
    let tools = Arc::new(tool_manager);

    // Create session manager
    let sessions = Arc::new(
        SessionManager::new(&config.memory.db_path)
            .map_err(|e| anyhow::anyhow!("Failed to create session manager: {}", e))?,
    );

    // Requests without a sessionId share this conversation
    let default_session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!("Default session id: {}", default_session_id);

    // Start HTTP API server
    let api_port = config.api.port;
    let server = tokio::spawn(cal_api::start_server(
        api_port,
        config,
        llm,
        sessions,
        tools,
        default_session_id,
    ));
    tracing::info!("HTTP API server started on port {}", api_port);
    tracing::info!("Press Ctrl+C to exit");

    // Wait for shutdown signal or server failure
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
        }
        result = server => {
            match result {
                Ok(Err(e)) => tracing::error!("HTTP API error: {}", e),
                Err(e) => tracing::error!("HTTP API task panicked: {}", e),
                Ok(Ok(())) => {}
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
