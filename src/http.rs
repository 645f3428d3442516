use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{middleware, response::IntoResponse, routing::get, Json, Router};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::auth::{api_key_middleware, ApiKeyAuth};
use crate::constants::MCP_PATH;
use crate::service::Weather;

/// Builds the HTTP application: info and health routes, the MCP service, and the auth gate
pub fn router(weather: Weather, auth: Arc<ApiKeyAuth>) -> Router {
    let mcp_service = StreamableHttpService::new(
        move || Ok(weather.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest_service(MCP_PATH, mcp_service)
        .layer(middleware::from_fn_with_state(auth, api_key_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Secure Weather MCP Server",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "MCP server providing weather forecasts and alerts",
        "authentication": "Required for MCP endpoints (X-API-Key header)",
        "tools": ["get_forecast", "get_alerts"],
        "status": "running"
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "weather-mcp-server"
    }))
}

/// Serves the router on `0.0.0.0:port` until Ctrl-C
pub async fn serve(weather: Weather, auth: Arc<ApiKeyAuth>, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("Listening on http://{}", addr);
    tracing::info!(
        protected = ?auth.protected_paths(),
        "API key authentication enabled"
    );

    let app = router(weather, auth);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received shutdown signal");
        })
        .await?;

    Ok(())
}
