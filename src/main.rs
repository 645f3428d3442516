use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rmcp::ServiceExt;

use secure_weather_mcp::{auth::ApiKeyAuth, config::ServerConfig, http, logging, service::Weather};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// Streamable HTTP at /mcp, gated by X-API-Key
    Http,
}

/// MCP server exposing National Weather Service forecasts and alerts
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, value_enum, default_value = "stdio")]
    transport: Transport,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::init("secure-weather-mcp", "secure_weather_mcp=info,tower_http=info")?;

    let args = Args::parse();
    let config = ServerConfig::from_env()?;
    let weather = Weather::with_api_base(&config.nws_api_base)?;

    match args.transport {
        Transport::Stdio => {
            tracing::info!("Starting MCP weather server on stdio");
            let server = weather.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;
        }
        Transport::Http => {
            let api_key = config.require_api_key()?;
            tracing::info!(port = config.port, "Starting MCP weather server on HTTP");
            let auth = ApiKeyAuth::new(api_key).with_protected_paths(config.protected_paths.clone());
            http::serve(weather, Arc::new(auth), config.port).await?;
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
