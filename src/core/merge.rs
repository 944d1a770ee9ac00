use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{MergedForecast, ModelProvenance, Settings};
use crate::provider::registry::{AUTO_MODEL, CURRENTS_FALLBACK_MODEL, SST_FALLBACK_MODEL};
use crate::provider::{
    MarineProvider, WeatherProvider, MARINE_ALL, MARINE_CURRENTS, MARINE_SST, MARINE_WAVES,
};

/// A load fails only when one of the two required fetches fails; the error
/// says which provider it was and carries the provider's reason.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Marine forecast failed: {0}")]
    Marine(String),
    #[error("Weather forecast failed: {0}")]
    Weather(String),
}

/// Orchestrates one load: base marine fetch, optional wave-model override,
/// optional SST/currents back-fill, then the weather fetch. Later steps merge
/// into the series assembled by earlier ones, so the order is fixed.
pub struct MergeEngine {
    marine: Arc<dyn MarineProvider>,
    weather: Arc<dyn WeatherProvider>,
}

impl MergeEngine {
    pub fn new(marine: Arc<dyn MarineProvider>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { marine, weather }
    }

    pub async fn load_forecast(
        &self,
        lat: f64,
        lon: f64,
        settings: &Settings,
    ) -> Result<MergedForecast, LoadError> {
        let tz = settings.timezone.as_str();

        // 1. Base series from the provider's best-match model. Authoritative
        // unless a later step overrides or back-fills a variable group.
        let mut marine = self
            .marine
            .fetch_hourly(lat, lon, MARINE_ALL, None, tz)
            .await
            .map_err(|e| LoadError::Marine(e.to_string()))?;

        let mut provenance = ModelProvenance {
            wave_model: AUTO_MODEL.to_string(),
            requested_override: settings.wave_model.clone(),
            merged: Vec::new(),
        };

        // 2. Optional wave-model override: waves only, non-fatal. An override
        // that returns no finite wave heights is ignored and the base series
        // stays in place, visible only through the provenance record.
        if settings.wave_model != AUTO_MODEL {
            match self
                .marine
                .fetch_hourly(lat, lon, MARINE_WAVES, Some(&settings.wave_model), tz)
                .await
            {
                Ok(wave) if wave.any_finite("wave_height") => {
                    for k in MARINE_WAVES {
                        if let Some(vals) = wave.var(k) {
                            marine.set_var(k, vals.to_vec());
                        }
                    }
                    provenance.wave_model = settings.wave_model.clone();
                    info!("Wave model override '{}' applied", settings.wave_model);
                }
                Ok(_) => {
                    debug!(
                        "Wave model override '{}' returned no finite wave heights, keeping base",
                        settings.wave_model
                    );
                }
                Err(e) => {
                    debug!(
                        "Wave model override '{}' fetch failed, keeping base: {}",
                        settings.wave_model, e
                    );
                }
            }
        }

        // 3. Optional extras back-fill, each independently best-effort.
        if settings.merge_extras {
            if !marine.any_finite("sea_surface_temperature") {
                if let Ok(sst) = self
                    .marine
                    .fetch_hourly(lat, lon, MARINE_SST, Some(SST_FALLBACK_MODEL), tz)
                    .await
                {
                    if sst.any_finite("sea_surface_temperature") {
                        if let Some(vals) = sst.var("sea_surface_temperature") {
                            marine.set_var("sea_surface_temperature", vals.to_vec());
                        }
                        provenance.merged.push("SST".to_string());
                    }
                }
            }

            if !marine.any_finite("ocean_current_velocity") {
                if let Ok(cur) = self
                    .marine
                    .fetch_hourly(lat, lon, MARINE_CURRENTS, Some(CURRENTS_FALLBACK_MODEL), tz)
                    .await
                {
                    if cur.any_finite("ocean_current_velocity") {
                        for k in MARINE_CURRENTS {
                            if let Some(vals) = cur.var(k) {
                                marine.set_var(k, vals.to_vec());
                            }
                        }
                        provenance.merged.push("Currents".to_string());
                    }
                }
            }
        }

        // 4. Wind from the weather provider, on its own timestamp axis. This
        // is the second required step; failure aborts the whole load.
        let weather = self
            .weather
            .fetch_wind(lat, lon, tz)
            .await
            .map_err(|e| LoadError::Weather(e.to_string()))?;

        Ok(MergedForecast {
            marine,
            weather,
            provenance,
        })
    }
}

/// Per-pass forecast cache keyed by spot id, so alerts and comparisons that
/// share spots reuse one fetch within a pass.
pub type ForecastCache = HashMap<String, Arc<MergedForecast>>;

/// Resolve a spot id to its forecast: pass cache first, then the persisted
/// last-loaded snapshot, then a fresh fetch for a known favorite. Returns
/// None when the spot is unknown or its fetch failed (the pass moves on).
pub async fn ensure_spot_data(
    pool: &sqlx::SqlitePool,
    engine: &MergeEngine,
    settings: &Settings,
    spot_id: &str,
    cache: &mut ForecastCache,
) -> Option<Arc<MergedForecast>> {
    if let Some(data) = cache.get(spot_id) {
        return Some(data.clone());
    }

    if let Ok(Some(snapshot)) = crate::store::get_last_snapshot(pool).await {
        if snapshot.spot.id == spot_id {
            let data = Arc::new(snapshot.data);
            cache.insert(spot_id.to_string(), data.clone());
            return Some(data);
        }
    }

    let fav = match crate::store::get_favorite(pool, spot_id).await {
        Ok(Some(fav)) => fav,
        _ => return None,
    };

    crate::core::rate_limiter::RateLimiter::wait("marine").await;
    match engine.load_forecast(fav.lat, fav.lon, settings).await {
        Ok(data) => {
            let data = Arc::new(data);
            cache.insert(spot_id.to_string(), data.clone());
            Some(data)
        }
        Err(e) => {
            debug!("Forecast fetch for {} failed during pass: {}", spot_id, e);
            None
        }
    }
}
