//! Stub National Weather Service API bound on an ephemeral local port.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

/// Starts `app` on `127.0.0.1:0` and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Rejects requests that do not identify themselves the way the NWS API asks.
fn check_headers(headers: &HeaderMap) -> Result<(), Response> {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    let agent = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok());
    match (accept, agent) {
        (Some("application/geo+json"), Some(ua)) if ua.starts_with("secure-weather-mcp/") => Ok(()),
        _ => Err(StatusCode::BAD_REQUEST.into_response()),
    }
}

fn alert(event: &str) -> Value {
    json!({
        "properties": {
            "event": event,
            "areaDesc": "King County",
            "severity": "Moderate",
            "description": format!("{event} in effect."),
            "instruction": "Stay informed."
        }
    })
}

async fn alerts(Path(state): Path<String>, headers: HeaderMap) -> Response {
    if let Err(rejection) = check_headers(&headers) {
        return rejection;
    }
    match state.as_str() {
        "WA" => Json(json!({"type": "FeatureCollection", "features": []})).into_response(),
        "TX" => Json(json!({"features": [alert("Heat Advisory"), alert("Flood Watch"), alert("Wind Advisory")]}))
            .into_response(),
        "ZZ" => Json(json!({"type": "FeatureCollection"})).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn points(
    State(base): State<String>,
    Path(coords): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = check_headers(&headers) {
        return rejection;
    }
    match coords.as_str() {
        "47.6062,-122.3321" => Json(json!({
            "properties": {"forecast": format!("{base}/gridpoints/SEW/124,67/forecast")}
        }))
        .into_response(),
        "0,0" => Json(json!({"properties": {}})).into_response(),
        "1,1" => Json(json!({})).into_response(),
        "2,2" => Json(json!({
            "properties": {"forecast": format!("{base}/gridpoints/BAD/1,1/forecast")}
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

pub const PERIOD_NAMES: [&str; 7] = [
    "This Afternoon",
    "Tonight",
    "Monday",
    "Monday Night",
    "Tuesday",
    "Tuesday Night",
    "Wednesday",
];

async fn forecast(Path((office, grid)): Path<(String, String)>, headers: HeaderMap) -> Response {
    if let Err(rejection) = check_headers(&headers) {
        return rejection;
    }
    if office != "SEW" || grid != "124,67" {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    let periods: Vec<Value> = PERIOD_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "number": i + 1,
                "name": name,
                "temperature": 50 + i,
                "temperatureUnit": "F",
                "windSpeed": "5 to 10 mph",
                "windDirection": "SW",
                "shortForecast": "Cloudy",
                "detailedForecast": format!("Forecast for {name}.")
            })
        })
        .collect();
    Json(json!({"properties": {"periods": periods}})).into_response()
}

/// Spawns the stub upstream and returns its base URL.
pub async fn spawn_nws_stub() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base = format!("http://{addr}");

    let app = Router::new()
        .route("/alerts/active/area/{state}", get(alerts))
        .route("/points/{coords}", get(points))
        .route("/gridpoints/{office}/{grid}/forecast", get(forecast))
        .with_state(base.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}
