//! JiraBridge
//!
//! Serves Jira ticket operations over HTTP, or over MCP on stdio with `--mcp`.

use anyhow::{Context, Result};
use clap::Parser;
use jirabridge_core::models::Config;
use jirabridge_core::storage::{init_config_dir, init_data_dir, load_process_env, ConfigStorage};
use jirabridge_server::{mcp, start_server, AppState, TicketService};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "jirabridge")]
#[command(about = "Jira ticket operations over HTTP and MCP", long_about = None)]
struct Args {
    /// Path to a config.json (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long)]
    host: Option<String>,

    /// Port for the HTTP server
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Run in Model Context Protocol (MCP) server mode on stdio
    #[arg(long)]
    mcp: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.mcp {
        init_mcp_logging(&config.server.log_level);
        let service = Arc::new(TicketService::from_config(&config)?);
        mcp::run_mcp_server(service).await
    } else {
        run_http(config).await
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let storage = match &args.config {
        Some(path) => ConfigStorage::from_file(path.clone()),
        None => ConfigStorage::new(init_config_dir()?),
    };

    let mut config = storage
        .load()
        .with_context(|| format!("failed to load {}", storage.path().display()))?;
    load_process_env(&mut config)?;

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = &args.log_level {
        config.server.log_level = level.clone();
    }

    config
        .validate()
        .with_context(|| format!("invalid configuration in {}", storage.path().display()))?;
    Ok(config)
}

/// stdout carries the protocol in MCP mode, so logs go to stderr.
fn init_mcp_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(level)
        .with_ansi(false)
        .init();
}

async fn run_http(config: Config) -> Result<()> {
    let data_dir = init_data_dir()?;
    let log_file_path = data_dir.join("jirabridge.log");

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let stdout_writer = std::io::stdout.with_max_level(tracing::Level::INFO);
    let file_writer = log_file.with_max_level(tracing::Level::DEBUG);

    tracing_subscriber::fmt()
        .with_writer(stdout_writer.and(file_writer))
        .with_env_filter(&config.server.log_level)
        .with_ansi(false)
        .init();

    tracing::info!("JiraBridge starting...");
    tracing::info!("Jira API: {}", config.jira.api_base());
    tracing::info!("Log file: {}", log_file_path.display());

    let service = Arc::new(TicketService::from_config(&config)?);
    start_server(AppState::new(service), &config.server.bind_addr()).await
}
