use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::analysis::surf::surf_index;
use crate::core::merge::{ensure_spot_data, ForecastCache, MergeEngine};
use crate::core::timeseries::{build_index, local_now, now_index_at};
use crate::models::{MergedForecast, Spot};

// Rank favorites by their best upcoming hour: surf index minus a wind
// penalty. Hours with no index are skipped outright, and a spot with no
// scorable hour is left out of the ranking rather than ranked last.

const WIND_PENALTY: f64 = 0.4;
const MAX_SCANNED_FAVORITES: usize = 30;
const MAX_RANKED: usize = 20;

#[derive(Debug, Serialize, Clone)]
pub struct BestHour {
    pub time: String,
    pub score: f64,
    pub hs: Option<f64>,
    pub swell_p: Option<f64>,
    pub wind: Option<f64>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SpotRanking {
    pub spot: Spot,
    pub best: BestHour,
}

/// Best-scoring hour in the window starting at the current hour. Pure scan;
/// the async plumbing lives in `compare_favorites`.
pub fn best_hour_at(
    data: &MergedForecast,
    window_hours: i64,
    now: NaiveDateTime,
) -> Option<BestHour> {
    let mt = &data.marine.time;
    let wi = build_index(&data.weather.time);

    let i_now = now_index_at(mt, now);
    let look = window_hours.clamp(6, 48) as usize;
    let end = (i_now + look).min(mt.len());

    let mut best: Option<BestHour> = None;
    for i in i_now..end {
        let t0 = &mt[i];
        let hs = data.marine.value_at("wave_height", i);
        let swell_p = data.marine.value_at("swell_wave_period", i);
        let Some(idx) = surf_index(hs, swell_p) else {
            continue;
        };

        let wind = wi
            .get(t0)
            .and_then(|&j| data.weather.value_at("wind_speed_10m", j));
        let score = idx - wind.map_or(0.0, |w| w * WIND_PENALTY);

        let better = best.as_ref().map_or(true, |b| score > b.score);
        if better {
            best = Some(BestHour {
                time: t0.clone(),
                score,
                hs,
                swell_p,
                wind,
            });
        }
    }
    best
}

/// Scan favorites (first 30 by list order), score each one's best hour in the
/// chosen window, and return the top 20 ranked by score descending.
pub async fn compare_favorites(
    pool: &SqlitePool,
    engine: &MergeEngine,
    window_hours: i64,
) -> anyhow::Result<Vec<SpotRanking>> {
    let settings = crate::store::load_settings(pool).await?;
    let favorites = crate::store::list_favorites(pool).await?;
    if favorites.is_empty() {
        return Ok(Vec::new());
    }

    info!("Comparing {} favorites over {}h", favorites.len(), window_hours);

    let mut cache = ForecastCache::new();
    let now = local_now();
    let mut rows = Vec::new();

    for fav in favorites.into_iter().take(MAX_SCANNED_FAVORITES) {
        let Some(data) = ensure_spot_data(pool, engine, &settings, &fav.id, &mut cache).await
        else {
            continue;
        };
        if let Some(best) = best_hour_at(&data, window_hours, now) {
            rows.push(SpotRanking { spot: fav, best });
        }
    }

    rows.sort_by(|a, b| {
        b.best
            .score
            .partial_cmp(&a.best.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(MAX_RANKED);
    Ok(rows)
}
