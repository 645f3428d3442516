use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{header::ACCEPT, Client};
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::constants::{
    ALERTS_UNAVAILABLE, DETAILED_FORECAST_UNAVAILABLE, FORECAST_UNAVAILABLE, FORECAST_URL_MISSING,
    NWS_ACCEPT, REQUEST_TIMEOUT_SECS, USER_AGENT,
};
use crate::error::FetchError;
use crate::formatters::{format_alerts, format_forecast};
use crate::models::{
    AlertResponse, ForecastResponse, GetAlertsRequest, GetForecastRequest, PointsResponse,
};

/// Weather service exposing `get_alerts` and `get_forecast` as MCP tools
#[derive(Clone)]
pub struct Weather {
    client: Arc<Client>,
    api_base: Arc<str>,
    tool_router: ToolRouter<Self>,
}

impl Weather {
    /// Creates a service talking to the NWS-compatible API at `api_base`
    pub fn with_api_base(api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            api_base: Arc::from(api_base.trim_end_matches('/')),
            tool_router: Self::tool_router(),
        })
    }

    /// Makes a single HTTP GET request and deserializes the JSON response
    async fn make_request<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, NWS_ACCEPT)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        response.json::<T>().await.map_err(FetchError::Decode)
    }

    /// Active alerts for a state, or a fixed message when none can be shown
    pub async fn alerts_for_state(&self, state: &str) -> String {
        let url = format!("{}/alerts/active/area/{}", self.api_base, state);

        match self.make_request::<AlertResponse>(&url).await {
            Ok(alerts) => format_alerts(&alerts),
            Err(e) => {
                tracing::warn!(%url, error = %e, "Failed to fetch alerts");
                ALERTS_UNAVAILABLE.to_string()
            }
        }
    }

    /// Next forecast periods for a point, resolved through the points endpoint
    pub async fn forecast_for_point(&self, latitude: f64, longitude: f64) -> String {
        let points_url = format!("{}/points/{},{}", self.api_base, latitude, longitude);

        let points = match self.make_request::<Value>(&points_url).await {
            Ok(points) if !is_empty_payload(&points) => points,
            Ok(_) => {
                tracing::warn!(url = %points_url, "Grid points response was empty");
                return FORECAST_UNAVAILABLE.to_string();
            }
            Err(e) => {
                tracing::warn!(url = %points_url, error = %e, "Failed to fetch grid points");
                return FORECAST_UNAVAILABLE.to_string();
            }
        };

        let forecast_url = PointsResponse::deserialize(&points)
            .ok()
            .and_then(|points| points.properties.forecast);
        let Some(forecast_url) = forecast_url else {
            return FORECAST_URL_MISSING.to_string();
        };

        match self.make_request::<ForecastResponse>(&forecast_url).await {
            Ok(forecast) => format_forecast(&forecast),
            Err(e) => {
                tracing::warn!(url = %forecast_url, error = %e, "Failed to fetch forecast");
                DETAILED_FORECAST_UNAVAILABLE.to_string()
            }
        }
    }
}

/// An empty body carries no location data at all, unlike one missing only the forecast link
fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[tool_handler]
impl ServerHandler for Weather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "weather".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "A weather information service powered by the National Weather Service API. \
                Provides weather alerts and forecasts for US locations."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Weather {
    /// Gets active weather alerts for a US state
    #[tool(description = "Get weather alerts for a US state. Provide a two-letter state code (e.g., 'CA' for California, 'WA' for Washington).")]
    async fn get_alerts(
        &self,
        Parameters(request): Parameters<GetAlertsRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting alerts for state: {}", request.state);

        let formatted = self.alerts_for_state(&request.state).await;

        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Gets the forecast for a US location
    #[tool(description = "Get weather forecast for a location. Provide latitude and longitude (e.g., latitude: 47.6062, longitude: -122.3321 for Seattle). Returns the next 5 forecast periods.")]
    async fn get_forecast(
        &self,
        Parameters(request): Parameters<GetForecastRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            "Getting forecast for coordinates: {}, {}",
            request.latitude,
            request.longitude
        );

        let formatted = self
            .forecast_for_point(request.latitude, request.longitude)
            .await;

        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_both_tools() {
        let weather = Weather::with_api_base("http://127.0.0.1:9").unwrap();
        let mut names: Vec<String> = weather
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["get_alerts", "get_forecast"]);
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base() {
        let weather = Weather::with_api_base("http://localhost:8080/").unwrap();
        assert_eq!(&*weather.api_base, "http://localhost:8080");
    }

    #[test]
    fn empty_payload_detection() {
        assert!(is_empty_payload(&serde_json::json!({})));
        assert!(is_empty_payload(&Value::Null));
        assert!(!is_empty_payload(&serde_json::json!({"properties": {}})));
    }

    #[tokio::test]
    async fn unreachable_upstream_yields_fallbacks() {
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = closed.local_addr().unwrap();
        drop(closed);

        let weather = Weather::with_api_base(&format!("http://{addr}")).unwrap();
        assert_eq!(
            weather.alerts_for_state("WA").await,
            "Unable to fetch alerts or no alerts found."
        );
        assert_eq!(
            weather.forecast_for_point(47.6, -122.3).await,
            "Unable to fetch forecast data for this location."
        );
    }
}
