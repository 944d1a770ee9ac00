pub mod analysis;
pub mod core;
pub mod export;
pub mod models;
pub mod provider;
pub mod store;
pub mod units;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::analysis::compare::{compare_favorites, SpotRanking};
use crate::analysis::summary::{build_summary, SpotSummary};
use crate::core::alerts::run_all_checks;
use crate::core::merge::{LoadError, MergeEngine};
use crate::core::scheduler::AlertScheduler;
use crate::core::timeseries::local_now;
use crate::models::{GeocodeResult, LastSnapshot, MergedForecast, Settings, Spot};
use crate::provider::geocode::OpenMeteoGeocoder;
use crate::provider::open_meteo::OpenMeteoMarine;
use crate::provider::weather::OpenMeteoWeather;
use crate::provider::{GeocodingProvider, LogNotifier, Notifier};

/// The state container owned by the application root. All persisted state
/// lives behind the pool; every component receives this by reference instead
/// of reaching for globals.
pub struct App {
    pub pool: SqlitePool,
    pub engine: Arc<MergeEngine>,
    pub notifier: Arc<dyn Notifier>,
    pub geocoder: Arc<dyn GeocodingProvider>,
    /// Spot id of the most recent load request. Used to discard a superseded
    /// load's result instead of overwriting the newer one.
    selected: Mutex<Option<String>>,
    scheduler: tokio::sync::Mutex<AlertScheduler>,
}

impl App {
    pub fn new(
        pool: SqlitePool,
        engine: Arc<MergeEngine>,
        notifier: Arc<dyn Notifier>,
        geocoder: Arc<dyn GeocodingProvider>,
    ) -> Self {
        Self {
            pool,
            engine,
            notifier,
            geocoder,
            selected: Mutex::new(None),
            scheduler: tokio::sync::Mutex::new(AlertScheduler::new()),
        }
    }

    /// App wired to the live Open-Meteo providers and the logging notifier.
    pub fn with_open_meteo(pool: SqlitePool) -> Self {
        let engine = Arc::new(MergeEngine::new(
            Arc::new(OpenMeteoMarine::new()),
            Arc::new(OpenMeteoWeather::new()),
        ));
        Self::new(
            pool,
            engine,
            Arc::new(LogNotifier),
            Arc::new(OpenMeteoGeocoder::new()),
        )
    }

    pub async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>> {
        self.geocoder.search(query, 10).await
    }

    /// Load a forecast for a spot and commit it as the last-loaded snapshot.
    /// If another load was requested while this one was in flight, the result
    /// is still returned but NOT committed, so the newer request wins.
    pub async fn load_spot(&self, spot: &Spot) -> Result<MergedForecast, LoadError> {
        let mut spot = spot.clone();

        // A favorite's stored orientation carries over to this load.
        if spot.face_deg.is_none() {
            if let Ok(Some(fav)) = store::get_favorite(&self.pool, &spot.id).await {
                spot.face_deg = fav.face_deg;
            }
        }

        {
            let mut selected = self.selected.lock().unwrap();
            *selected = Some(spot.id.clone());
        }

        let settings = store::load_settings(&self.pool).await.unwrap_or_default();
        let data = self
            .engine
            .load_forecast(spot.lat, spot.lon, &settings)
            .await?;

        let still_selected = {
            let selected = self.selected.lock().unwrap();
            selected.as_deref() == Some(spot.id.as_str())
        };
        if still_selected {
            let snapshot = LastSnapshot {
                spot: spot.clone(),
                data: data.clone(),
                fetched_at: chrono::Utc::now().to_rfc3339(),
            };
            if let Err(e) = store::save_last_snapshot(&self.pool, &snapshot).await {
                tracing::warn!("Failed to persist snapshot for {}: {}", spot.id, e);
            }
        } else {
            info!("Discarding stale load result for {}", spot.id);
        }

        Ok(data)
    }

    /// Display-ready summary of the last loaded spot, or None when nothing
    /// has been loaded yet.
    pub async fn current_summary(&self) -> Result<Option<SpotSummary>> {
        let Some(snapshot) = store::get_last_snapshot(&self.pool).await? else {
            return Ok(None);
        };
        let settings = store::load_settings(&self.pool).await?;
        Ok(Some(build_summary(
            &snapshot.spot,
            &snapshot.data,
            &settings,
            local_now(),
        )))
    }

    /// Add the spot to favorites if absent, remove it otherwise. Returns
    /// whether it is a favorite afterwards.
    pub async fn toggle_favorite(&self, spot: &Spot) -> Result<bool> {
        if store::is_favorite(&self.pool, &spot.id).await? {
            store::remove_favorite(&self.pool, &spot.id).await?;
            Ok(false)
        } else {
            store::add_favorite(&self.pool, spot).await?;
            Ok(true)
        }
    }

    pub async fn run_checks(&self) -> Result<()> {
        run_all_checks(&self.pool, &self.engine, self.notifier.as_ref()).await
    }

    pub async fn compare(&self, window_hours: i64) -> Result<Vec<SpotRanking>> {
        compare_favorites(&self.pool, &self.engine, window_hours).await
    }

    /// Start (or re-arm) the periodic alert check with the persisted
    /// interval. The previous job is cancelled first.
    pub async fn restart_scheduler(&self) -> Result<()> {
        let settings = store::load_settings(&self.pool).await?;
        let mut scheduler = self.scheduler.lock().await;
        scheduler
            .restart(
                self.pool.clone(),
                self.engine.clone(),
                self.notifier.clone(),
                settings.alert_check_minutes,
            )
            .await
    }

    pub async fn stop_scheduler(&self) {
        self.scheduler.lock().await.stop().await;
    }

    /// Persist new settings and re-arm the check timer with the new interval.
    pub async fn update_settings(&self, settings: &Settings) -> Result<()> {
        store::save_settings(&self.pool, settings).await?;
        self.restart_scheduler().await
    }
}
