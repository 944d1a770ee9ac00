use async_trait::async_trait;
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::MarineProvider;
use crate::models::HourlySeries;

const FORECAST_DAYS: &str = "8";

pub struct OpenMeteoMarine {
    client: Client,
    base_url: String,
}

impl OpenMeteoMarine {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("surfcast/0.1")
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: "https://marine-api.open-meteo.com/v1/marine".to_string(),
        }
    }
}

impl Default for OpenMeteoMarine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarineProvider for OpenMeteoMarine {
    fn name(&self) -> &str {
        "open-meteo-marine"
    }

    async fn fetch_hourly(
        &self,
        lat: f64,
        lon: f64,
        variables: &[&str],
        model: Option<&str>,
        timezone: &str,
    ) -> Result<HourlySeries> {
        let hourly = variables.join(",");
        let mut params = vec![
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("hourly", hourly),
            ("forecast_days", FORECAST_DAYS.to_string()),
            ("timezone", timezone.to_string()),
            // Coastal points often fall on a land cell; ask for the sea cell.
            ("cell_selection", "sea".to_string()),
        ];
        if let Some(model) = model {
            params.push(("models", model.to_string()));
        }

        let resp = self.client.get(&self.base_url).query(&params).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            // The API reports the reason in the error body when it has one.
            if let Ok(json) = serde_json::from_str::<Value>(&body) {
                if let Some(reason) = json["reason"].as_str() {
                    return Err(anyhow!("Marine API error: {}", reason));
                }
            }
            return Err(anyhow!("Marine API error: {}", status));
        }

        let json: Value = resp.json().await?;
        if json["error"].as_bool() == Some(true) {
            return Err(anyhow!(
                "Marine API error: {}",
                json["reason"].as_str().unwrap_or("unknown reason")
            ));
        }

        parse_hourly(&json, variables)
    }
}

/// Pull the hourly block out of a forecast response. Every requested variable
/// becomes a column at the axis length; non-numeric entries become None.
pub(crate) fn parse_hourly(json: &Value, variables: &[&str]) -> Result<HourlySeries> {
    let hourly = &json["hourly"];
    let time_raw = hourly["time"]
        .as_array()
        .ok_or_else(|| anyhow!("No hourly time axis in response"))?;

    let time: Vec<String> = time_raw
        .iter()
        .filter_map(|t| t.as_str().map(|s| s.to_string()))
        .collect();

    let mut series = HourlySeries {
        time,
        values: Default::default(),
    };

    for name in variables {
        let column: Vec<Option<f64>> = match hourly[*name].as_array() {
            Some(vals) => vals
                .iter()
                .map(|v| v.as_f64().filter(|x| x.is_finite()))
                .collect(),
            None => Vec::new(),
        };
        series.set_var(name, column);
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_response() {
        let json_data = json!({
            "hourly": {
                "time": ["2026-08-06T00:00", "2026-08-06T01:00"],
                "wave_height": [1.5, 1.8],
                "swell_wave_period": [10.0, 11.0]
            }
        });

        let s = parse_hourly(&json_data, &["wave_height", "swell_wave_period"]).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.value_at("wave_height", 1), Some(1.8));
        assert_eq!(s.value_at("swell_wave_period", 0), Some(10.0));
    }

    #[test]
    fn test_parse_nulls_stay_missing() {
        let json_data = json!({
            "hourly": {
                "time": ["2026-08-06T00:00", "2026-08-06T01:00"],
                "sea_surface_temperature": [null, "n/a"]
            }
        });

        let s = parse_hourly(&json_data, &["sea_surface_temperature"]).unwrap();
        assert_eq!(s.value_at("sea_surface_temperature", 0), None);
        assert_eq!(s.value_at("sea_surface_temperature", 1), None);
        assert!(!s.any_finite("sea_surface_temperature"));
    }

    #[test]
    fn test_parse_absent_variable_is_all_missing() {
        let json_data = json!({
            "hourly": { "time": ["2026-08-06T00:00"] }
        });

        let s = parse_hourly(&json_data, &["ocean_current_velocity"]).unwrap();
        assert_eq!(s.var("ocean_current_velocity").unwrap().len(), 1);
        assert_eq!(s.value_at("ocean_current_velocity", 0), None);
    }

    #[test]
    fn test_parse_missing_axis_is_error() {
        let json_data = json!({ "error": "bad request" });
        assert!(parse_hourly(&json_data, &["wave_height"]).is_err());
    }
}
