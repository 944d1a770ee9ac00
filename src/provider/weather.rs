use async_trait::async_trait;
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{WeatherProvider, WEATHER_HOURLY};
use crate::models::HourlySeries;

pub struct OpenMeteoWeather {
    client: Client,
    base_url: String,
}

impl OpenMeteoWeather {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("surfcast/0.1")
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

impl Default for OpenMeteoWeather {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeather {
    fn name(&self) -> &str {
        "open-meteo-weather"
    }

    async fn fetch_wind(&self, lat: f64, lon: f64, timezone: &str) -> Result<HourlySeries> {
        let params = [
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("hourly", WEATHER_HOURLY.join(",")),
            ("forecast_days", "8".to_string()),
            ("timezone", timezone.to_string()),
            // Pin the response to canonical units regardless of API defaults.
            ("wind_speed_unit", "kmh".to_string()),
            ("temperature_unit", "celsius".to_string()),
        ];

        let resp = self.client.get(&self.base_url).query(&params).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if let Ok(json) = serde_json::from_str::<Value>(&body) {
                if let Some(reason) = json["reason"].as_str() {
                    return Err(anyhow!("Weather API error: {}", reason));
                }
            }
            return Err(anyhow!("Weather API error: {}", status));
        }

        let json: Value = resp.json().await?;
        if json["error"].as_bool() == Some(true) {
            return Err(anyhow!(
                "Weather API error: {}",
                json["reason"].as_str().unwrap_or("unknown reason")
            ));
        }

        super::open_meteo::parse_hourly(&json, WEATHER_HOURLY)
    }
}
