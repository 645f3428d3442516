use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::constants::WWW_AUTHENTICATE_CHALLENGE;

/// Failure of a single upstream HTTP GET
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, timeout or other transport-level failure
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("request failed with status: {0}")]
    Status(reqwest::StatusCode),

    /// Body could not be decoded into the expected shape
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Rejection produced by the API-key gate.
///
/// Both variants map to HTTP 401 with a `WWW-Authenticate` challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing API key, expected in X-API-Key header.")]
    MissingKey,

    #[error("Invalid API key, expected in X-API-Key header.")]
    InvalidKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, WWW_AUTHENTICATE_CHALLENGE)],
            Json(json!({ "detail": self.to_string() })),
        )
            .into_response()
    }
}

/// Failure talking to the chat-completion endpoint or driving the relay loop
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat API error ({status}): {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("chat API returned no choices")]
    EmptyResponse,

    #[error("model requested tools for more than {0} rounds")]
    TooManyToolRounds(usize),
}

/// Failure invoking a tool on the MCP server
#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    #[error("tool arguments must be a JSON object")]
    InvalidArguments,

    #[error("MCP call failed: {0}")]
    Service(String),

    #[error("tool reported an error: {0}")]
    Tool(String),
}

/// Startup configuration problems
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}
