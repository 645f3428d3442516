/// User agent string for HTTP requests
pub const USER_AGENT: &str = "secure-weather-mcp/0.1.0";

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Media type requested from the NWS API
pub const NWS_ACCEPT: &str = "application/geo+json";

/// Timeout applied to every upstream weather request, in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Number of forecast periods returned by `get_forecast`
pub const FORECAST_PERIODS: usize = 5;

/// Separator placed between formatted alerts and forecast periods
pub const BLOCK_SEPARATOR: &str = "\n---\n";

/// Header carrying the shared secret on protected endpoints
pub const API_KEY_HEADER: &str = "x-api-key";

/// Challenge sent with every 401 from the auth gate
pub const WWW_AUTHENTICATE_CHALLENGE: &str = "ApiKey realm=\"API\"";

/// Path of the streamable HTTP MCP endpoint
pub const MCP_PATH: &str = "/mcp";

/// Path prefix protected by default
pub const DEFAULT_PROTECTED_PATH: &str = MCP_PATH;

/// Port used by the HTTP transport when `PORT` is unset
pub const DEFAULT_PORT: u16 = 5000;

/// Azure OpenAI REST API version used when none is configured
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-10-21";

// Fixed user-facing strings returned by the weather tools.
pub const ALERTS_UNAVAILABLE: &str = "Unable to fetch alerts or no alerts found.";
pub const NO_ACTIVE_ALERTS: &str = "No active alerts for this state.";
pub const FORECAST_UNAVAILABLE: &str = "Unable to fetch forecast data for this location.";
pub const FORECAST_URL_MISSING: &str = "Unable to determine forecast URL for this location.";
pub const DETAILED_FORECAST_UNAVAILABLE: &str = "Unable to fetch detailed forecast.";
