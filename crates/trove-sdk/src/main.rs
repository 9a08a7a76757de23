//! Trove MCP Server - Entry Point
//!
//! Provides both stdio and HTTP transports.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use trove_sdk::{Config, TroveClient, server::McpServer};

#[derive(Parser, Debug)]
#[command(name = "trove-mcp")]
#[command(about = "MCP server for the Trove API (National Library of Australia)")]
#[command(version)]
struct Cli {
    /// Trove API key (required by every Trove v3 endpoint)
    #[arg(long, env = "TROVE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio")]
    transport: Transport,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Bearer token required on /mcp (only used with --transport http)
    #[arg(long, env = "MCP_SERVER_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output
    #[default]
    Stdio,
    /// Streamable HTTP
    Http,
}

/// Logs go to stderr; in stdio mode stdout is reserved for JSON-RPC.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting Trove MCP server"
    );

    let mut config = Config::from_env()?;
    if let Some(api_key) = cli.api_key {
        config = config.with_api_key(api_key);
    }
    if cli.auth_token.is_some() {
        config.auth_token = cli.auth_token;
    }

    let auth_token = config.auth_token.clone();
    let client = TroveClient::new(config)?;
    let server = McpServer::new(client);

    match cli.transport {
        Transport::Stdio => server.run_stdio().await?,
        Transport::Http => server.run_http(cli.port, auth_token).await?,
    }

    Ok(())
}
