use serde::Deserialize;

use crate::constants::{
    DEFAULT_AZURE_API_VERSION, DEFAULT_PORT, DEFAULT_PROTECTED_PATH, NWS_API_BASE,
};
use crate::error::ConfigError;

/// Settings for the MCP weather server.
///
/// # Environment Variables
///
/// - `API_KEY`: shared secret for the HTTP transport (required in HTTP mode)
/// - `PORT`: HTTP listen port, defaults to 5000
/// - `PROTECTED_PATHS`: comma-separated path prefixes gated by the API key, defaults to `/mcp`
/// - `NWS_API_BASE`: weather API base URL
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub api_key: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_protected_paths")]
    pub protected_paths: Vec<String>,

    #[serde(default = "default_nws_api_base")]
    pub nws_api_base: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_protected_paths() -> Vec<String> {
    vec![DEFAULT_PROTECTED_PATH.to_string()]
}

fn default_nws_api_base() -> String {
    NWS_API_BASE.to_string()
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        envy::from_env::<Self>()?.validated()
    }

    /// Builds the config from explicit key/value pairs instead of the process environment
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Self>(vars)?.validated()
    }

    /// Trims each protected prefix and drops blanks; an empty list would disable the gate
    fn validated(mut self) -> Result<Self, ConfigError> {
        self.protected_paths = self
            .protected_paths
            .iter()
            .map(|path| path.trim())
            .filter(|path| !path.is_empty())
            .map(str::to_string)
            .collect();

        if self.protected_paths.is_empty() {
            return Err(ConfigError::Empty("PROTECTED_PATHS"));
        }
        Ok(self)
    }

    /// The shared secret, required before the HTTP transport may start
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        non_empty(self.api_key.as_deref(), "API_KEY")
    }
}

/// Settings for the interactive weather agent.
///
/// `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY` and
/// `AZURE_OPENAI_DEPLOYMENT_NAME` are required. `MCP_SERVER_URL` and
/// `API_KEY` are only needed when connecting to a remote server.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub azure_openai_endpoint: String,
    pub azure_openai_api_key: String,
    pub azure_openai_deployment_name: String,

    #[serde(default = "default_api_version")]
    pub azure_openai_api_version: String,

    pub mcp_server_url: Option<String>,
    pub api_key: Option<String>,
}

fn default_api_version() -> String {
    DEFAULT_AZURE_API_VERSION.to_string()
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        envy::from_env::<Self>()?.validated()
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Self>(vars)?.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        non_empty(Some(&self.azure_openai_endpoint), "AZURE_OPENAI_ENDPOINT")?;
        non_empty(Some(&self.azure_openai_api_key), "AZURE_OPENAI_API_KEY")?;
        non_empty(
            Some(&self.azure_openai_deployment_name),
            "AZURE_OPENAI_DEPLOYMENT_NAME",
        )?;
        Ok(self)
    }

    /// The secret sent as `X-API-Key` to a remote MCP server
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        non_empty(self.api_key.as_deref(), "API_KEY")
    }
}

fn non_empty<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Empty(name)),
    }
}
