use async_trait::async_trait;
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::GeocodingProvider;
use crate::models::GeocodeResult;

pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
}

impl OpenMeteoGeocoder {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("surfcast/0.1")
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
        }
    }
}

impl Default for OpenMeteoGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeocodingProvider for OpenMeteoGeocoder {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<GeocodeResult>> {
        #[derive(Deserialize)]
        struct GeoResponse {
            #[serde(default)]
            results: Vec<GeocodeResult>,
        }

        let params = [
            ("name", query.to_string()),
            ("count", count.to_string()),
            ("format", "json".to_string()),
        ];

        let resp = self.client.get(&self.base_url).query(&params).send().await?;

        if !resp.status().is_success() {
            return Err(anyhow!("Geocoding failed: {}", resp.status()));
        }

        let json: GeoResponse = resp.json().await?;
        Ok(json.results)
    }
}
