use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rmcp::{
    model::{CallToolRequestParam, ClientCapabilities, ClientInfo, Implementation, ProtocolVersion, Tool},
    service::RunningService,
    transport::{
        streamable_http_client::StreamableHttpClientTransportConfig, StreamableHttpClientTransport,
        TokioChildProcess,
    },
    RoleClient, ServiceExt,
};
use serde_json::Value;
use tokio::process::Command;

use crate::agent::chat::{ToolExecutor, ToolSpec};
use crate::constants::{API_KEY_HEADER, MCP_PATH};
use crate::error::ToolCallError;

/// Where the MCP server lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerTarget {
    /// Executable spawned as a child process speaking stdio
    Stdio(String),
    /// Streamable HTTP endpoint, always ending in `/mcp`
    Http(String),
}

impl ServerTarget {
    /// URLs select the HTTP transport; anything else is treated as an executable path
    pub fn parse(target: &str) -> Self {
        let target = target.trim();
        if target.starts_with("http://") || target.starts_with("https://") {
            Self::Http(mcp_endpoint(target))
        } else {
            Self::Stdio(target.to_string())
        }
    }
}

/// Appends `/mcp` to a server URL unless it already ends with it
pub fn mcp_endpoint(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if url.ends_with(MCP_PATH) {
        url.to_string()
    } else {
        format!("{url}{MCP_PATH}")
    }
}

fn client_info() -> ClientInfo {
    ClientInfo {
        protocol_version: ProtocolVersion::V_2024_11_05,
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "weather-agent".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            icons: None,
            title: None,
            website_url: None,
        },
    }
}

/// A live MCP client session
pub struct McpToolExecutor {
    service: RunningService<RoleClient, ClientInfo>,
}

impl McpToolExecutor {
    /// Connects to `target`. `api_key` is sent as `X-API-Key` on every HTTP request
    #[tracing::instrument(name = "connect_to_mcp_server", skip(api_key))]
    pub async fn connect(target: &ServerTarget, api_key: Option<&str>) -> Result<Self> {
        let service = match target {
            ServerTarget::Stdio(path) => {
                tracing::info!(%path, "Spawning MCP server over stdio");
                let transport = TokioChildProcess::new(Command::new(path))
                    .with_context(|| format!("failed to spawn MCP server {path}"))?;
                client_info().serve(transport).await?
            }
            ServerTarget::Http(url) => {
                tracing::info!(%url, "Connecting to MCP server over HTTP");
                let mut headers = HeaderMap::new();
                if let Some(key) = api_key {
                    let mut value = HeaderValue::from_str(key)
                        .context("API key is not a valid header value")?;
                    value.set_sensitive(true);
                    headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
                }
                let client = reqwest::Client::builder().default_headers(headers).build()?;
                let transport = StreamableHttpClientTransport::with_client(
                    client,
                    StreamableHttpClientTransportConfig::with_uri(url.as_str()),
                );
                client_info().serve(transport).await?
            }
        };

        if let Some(info) = service.peer_info() {
            tracing::info!(
                server = %info.server_info.name,
                version = %info.server_info.version,
                "Connected to MCP server"
            );
        }

        Ok(Self { service })
    }

    /// Closes the session (and stops a spawned child process)
    pub async fn shutdown(self) -> Result<()> {
        self.service.cancel().await?;
        Ok(())
    }
}

fn tool_spec(tool: Tool) -> ToolSpec {
    ToolSpec {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
        parameters: Value::Object((*tool.input_schema).clone()),
    }
}

#[async_trait]
impl ToolExecutor for McpToolExecutor {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolCallError> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| ToolCallError::Service(e.to_string()))?;
        Ok(tools.into_iter().map(tool_spec).collect())
    }

    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<String, ToolCallError> {
        let Value::Object(arguments) = arguments else {
            return Err(ToolCallError::InvalidArguments);
        };

        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments.clone()),
            })
            .await
            .map_err(|e| ToolCallError::Service(e.to_string()))?;

        let text = result
            .content
            .iter()
            .filter_map(|content| content.raw.as_text().map(|t| t.text.as_str()))
            .collect::<Vec<_>>()
            .join("\n");

        if result.is_error.unwrap_or(false) {
            return Err(ToolCallError::Tool(text));
        }
        Ok(text)
    }
}
