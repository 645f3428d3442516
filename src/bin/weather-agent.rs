use std::io::Write;

use anyhow::{bail, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Instrument;

use secure_weather_mcp::{
    agent::{AzureOpenAiClient, ChatCompletion, McpToolExecutor, RelayLoop, ServerTarget, ToolExecutor},
    config::AgentConfig,
    logging,
};

/// Interactive weather assistant backed by an MCP weather server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the MCP server executable, or the URL of a remote server.
    /// Defaults to MCP_SERVER_URL.
    server: Option<String>,
}

fn is_exit(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "exit" | "quit" | "q")
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "You: ")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::init("weather-agent", "secure_weather_mcp=warn")?;

    let args = Args::parse();
    let config = AgentConfig::from_env()?;

    let Some(server) = args.server.or_else(|| config.mcp_server_url.clone()) else {
        bail!("usage: weather-agent <path_to_mcp_server | server_url> (or set MCP_SERVER_URL)");
    };
    let target = ServerTarget::parse(&server);

    let api_key = match &target {
        ServerTarget::Http(_) => Some(config.require_api_key()?),
        ServerTarget::Stdio(_) => None,
    };

    let executor = McpToolExecutor::connect(&target, api_key).await?;
    let chat = AzureOpenAiClient::from_config(&config);

    println!("{}", "=".repeat(60));
    println!("Weather Agent");
    println!("{}", "=".repeat(60));
    println!("  - MCP Server: {server}");
    println!("  - Azure OpenAI: {}", chat.deployment());

    let mut relay = RelayLoop::start(chat, executor).await?;

    println!();
    println!("Ask weather questions like:");
    println!("  - Are there any alerts for California?");
    println!("  - Get forecast for latitude 47.6062, longitude -122.3321");
    println!();
    println!("Type 'exit' or 'quit' to end the session");
    println!("{}", "=".repeat(60));

    chat_loop(&mut relay)
        .instrument(tracing::info_span!("session_start"))
        .await?;

    relay.into_tools().shutdown().await?;
    Ok(())
}

/// Reads questions from stdin until an exit word, EOF or Ctrl-C
async fn chat_loop<C, T>(relay: &mut RelayLoop<C, T>) -> Result<()>
where
    C: ChatCompletion,
    T: ToolExecutor,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!("\n\nSession interrupted. Goodbye!");
                break;
            }
        };

        let Some(line) = line else {
            break;
        };
        let query = line.trim();

        if is_exit(query) {
            println!("\nGoodbye!");
            break;
        }
        if query.is_empty() {
            continue;
        }

        match relay.run_turn(query).await {
            Ok(answer) => println!("Agent: {answer}\n"),
            Err(e) => println!("\nERROR: {e}\n"),
        }
    }
    Ok(())
}
