use crate::constants::{BLOCK_SEPARATOR, FORECAST_PERIODS, NO_ACTIVE_ALERTS};
use crate::models::{AlertFeature, AlertResponse, ForecastPeriod, ForecastResponse};

/// Formats a single alert feature into a readable block
pub fn format_alert(feature: &AlertFeature) -> String {
    let props = &feature.properties;
    format!(
        "\nEvent: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}\n",
        props.event.as_deref().unwrap_or("Unknown"),
        props.area_desc.as_deref().unwrap_or("Unknown"),
        props.severity.as_deref().unwrap_or("Unknown"),
        props
            .description
            .as_deref()
            .unwrap_or("No description available"),
        props
            .instruction
            .as_deref()
            .unwrap_or("No specific instructions provided"),
    )
}

/// Formats active alerts, one block per feature
pub fn format_alerts(alerts: &AlertResponse) -> String {
    if alerts.features.is_empty() {
        return NO_ACTIVE_ALERTS.to_string();
    }

    alerts
        .features
        .iter()
        .map(format_alert)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

fn format_period(period: &ForecastPeriod) -> String {
    format!(
        "\n{}:\nTemperature: {}\u{00b0}{}\nWind: {} {}\nForecast: {}\n",
        period.name,
        period.temperature,
        period.temperature_unit,
        period.wind_speed,
        period.wind_direction,
        period.detailed_forecast
    )
}

/// Formats the next forecast periods, keeping upstream order
pub fn format_forecast(forecast: &ForecastResponse) -> String {
    forecast
        .properties
        .periods
        .iter()
        .take(FORECAST_PERIODS)
        .map(format_period)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertProperties, ForecastProperties};

    fn period(name: &str) -> ForecastPeriod {
        ForecastPeriod {
            name: name.to_string(),
            temperature: 61,
            temperature_unit: "F".to_string(),
            wind_speed: "5 mph".to_string(),
            wind_direction: "NW".to_string(),
            detailed_forecast: "Partly sunny.".to_string(),
        }
    }

    #[test]
    fn empty_alerts_yield_fixed_message() {
        let alerts = AlertResponse { features: vec![] };
        assert_eq!(format_alerts(&alerts), "No active alerts for this state.");
    }

    #[test]
    fn alert_fields_fall_back_when_missing() {
        let feature = AlertFeature {
            properties: AlertProperties {
                event: Some("Flood Watch".to_string()),
                ..Default::default()
            },
        };
        let text = format_alert(&feature);
        assert!(text.contains("Event: Flood Watch"));
        assert!(text.contains("Area: Unknown"));
        assert!(text.contains("Description: No description available"));
        assert!(text.contains("Instructions: No specific instructions provided"));
    }

    #[test]
    fn alerts_are_joined_with_separator() {
        let alerts = AlertResponse {
            features: (0..3)
                .map(|_| AlertFeature {
                    properties: AlertProperties::default(),
                })
                .collect(),
        };
        let text = format_alerts(&alerts);
        assert_eq!(text.split("\n---\n").count(), 3);
    }

    #[test]
    fn forecast_keeps_first_five_periods_in_order() {
        let names = ["Today", "Tonight", "Monday", "Monday Night", "Tuesday", "Tuesday Night"];
        let forecast = ForecastResponse {
            properties: ForecastProperties {
                periods: names.iter().map(|n| period(n)).collect(),
            },
        };
        let text = format_forecast(&forecast);
        let blocks: Vec<&str> = text.split("\n---\n").collect();
        assert_eq!(blocks.len(), 5);
        for (block, name) in blocks.iter().zip(names.iter()) {
            assert!(block.starts_with(&format!("\n{}:\n", name)), "{block}");
        }
        assert!(!text.contains("Tuesday Night"));
        assert!(text.contains("Temperature: 61\u{00b0}F"));
    }
}
