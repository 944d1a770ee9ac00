use async_trait::async_trait;
use anyhow::Result;
use std::time::Duration;

use crate::models::{GeocodeResult, HourlySeries};

pub mod geocode;
pub mod open_meteo;
pub mod registry;
pub mod weather;

// Hourly variable groups requested from the marine provider. The wave family
// is what a model override replaces; SST and currents each have their own
// fallback provider when the base model returns nothing for them.

pub const MARINE_ALL: &[&str] = &[
    "wave_height",
    "wave_direction",
    "wave_period",
    "wind_wave_height",
    "wind_wave_direction",
    "wind_wave_period",
    "swell_wave_height",
    "swell_wave_direction",
    "swell_wave_period",
    "secondary_swell_wave_height",
    "secondary_swell_wave_direction",
    "secondary_swell_wave_period",
    "sea_level_height_msl",
    "sea_surface_temperature",
    "ocean_current_velocity",
    "ocean_current_direction",
];

pub const MARINE_WAVES: &[&str] = &[
    "wave_height",
    "wave_direction",
    "wave_period",
    "wind_wave_height",
    "wind_wave_direction",
    "wind_wave_period",
    "swell_wave_height",
    "swell_wave_direction",
    "swell_wave_period",
    "secondary_swell_wave_height",
    "secondary_swell_wave_direction",
    "secondary_swell_wave_period",
    "sea_level_height_msl",
];

pub const MARINE_SST: &[&str] = &["sea_surface_temperature"];

pub const MARINE_CURRENTS: &[&str] = &["ocean_current_velocity", "ocean_current_direction"];

pub const WEATHER_HOURLY: &[&str] = &["wind_speed_10m", "wind_direction_10m", "wind_gusts_10m"];

/// Marine forecast source. `model` of None means the provider's own best
/// match ("auto"); an explicit id requests that model only.
#[async_trait]
pub trait MarineProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_hourly(
        &self,
        lat: f64,
        lon: f64,
        variables: &[&str],
        model: Option<&str>,
        timezone: &str,
    ) -> Result<HourlySeries>;
}

/// Weather source for the wind variables, pinned to canonical units
/// (km/h, °C) on its own timestamp axis.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_wind(&self, lat: f64, lon: f64, timezone: &str) -> Result<HourlySeries>;
}

#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<GeocodeResult>>;
}

/// On-demand single-shot device position.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<(f64, f64)>;
}

/// Bound a geolocation fix to 10 seconds, the same budget the GPS flow gives
/// the device before giving up.
pub async fn locate(geo: &dyn Geolocator) -> Result<(f64, f64)> {
    tokio::time::timeout(Duration::from_secs(10), geo.current_position())
        .await
        .map_err(|_| anyhow::anyhow!("Geolocation timed out"))?
}

/// Sink for user-visible alert notifications. Delivery is best-effort; the
/// alert pass ignores failures here.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Default notifier: writes the notification to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        tracing::info!("NOTIFICATION: {} - {}", title, body);
        Ok(())
    }
}
