use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// National Weather Service API Models
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AlertResponse {
    pub features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
pub struct AlertFeature {
    #[serde(default)]
    pub properties: AlertProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertProperties {
    pub event: Option<String>,
    #[serde(rename = "areaDesc")]
    pub area_desc: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PointsResponse {
    #[serde(default)]
    pub properties: PointsProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct PointsProperties {
    /// Absolute URL of the gridpoint forecast for these coordinates
    pub forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
pub struct ForecastProperties {
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastPeriod {
    pub name: String,
    pub temperature: i32,
    #[serde(rename = "temperatureUnit")]
    pub temperature_unit: String,
    #[serde(rename = "windSpeed")]
    pub wind_speed: String,
    #[serde(rename = "windDirection")]
    pub wind_direction: String,
    #[serde(rename = "detailedForecast")]
    pub detailed_forecast: String,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetAlertsRequest {
    /// Two-letter US state code (e.g. CA, NY, WA, TX)
    pub state: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetForecastRequest {
    /// Latitude of the location (e.g. 47.6062 for Seattle)
    pub latitude: f64,
    /// Longitude of the location (e.g. -122.3321 for Seattle)
    pub longitude: f64,
}
