use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::analysis::surf::surf_index;
use crate::analysis::wind::ang_diff;
use crate::core::merge::{ensure_spot_data, ForecastCache, MergeEngine};
use crate::core::timeseries::{build_index, local_now, now_index_at};
use crate::models::{Alert, AlertHit, MergedForecast, Settings};
use crate::provider::Notifier;
use crate::store;

pub const DEFAULT_WIND_DIR_TOL: f64 = 60.0;

/// Scan the look-ahead window from the current hour and return the FIRST
/// hour where every defined threshold passes. An hour missing a value some
/// threshold needs is skipped, never failed. Earliest-match by design: this
/// answers "does a qualifying window exist soon", not "which hour is best".
pub fn evaluate_alert(
    alert: &Alert,
    data: &MergedForecast,
    now: NaiveDateTime,
) -> Option<AlertHit> {
    let mt = &data.marine.time;
    let wi = build_index(&data.weather.time);

    let i_now = now_index_at(mt, now);
    let look = alert.look_hours.clamp(1, 192) as usize;
    let end = (i_now + look).min(mt.len());

    for i in i_now..end {
        let t0 = &mt[i];
        let j = wi.get(t0).copied();

        let hs = data.marine.value_at("wave_height", i);
        let swell_h = data.marine.value_at("swell_wave_height", i);
        let swell_p = data.marine.value_at("swell_wave_period", i);
        let idx = surf_index(hs, swell_p);

        let wind_sp = j.and_then(|j| data.weather.value_at("wind_speed_10m", j));
        let wind_dir = j.and_then(|j| data.weather.value_at("wind_direction_10m", j));

        if let Some(min) = alert.min_hs_m {
            match hs {
                Some(v) if v >= min => {}
                _ => continue,
            }
        }
        if let Some(min) = alert.min_swell_h_m {
            match swell_h {
                Some(v) if v >= min => {}
                _ => continue,
            }
        }
        if let Some(min) = alert.min_swell_p_s {
            match swell_p {
                Some(v) if v >= min => {}
                _ => continue,
            }
        }
        if let Some(min) = alert.min_idx {
            match idx {
                Some(v) if v >= min => {}
                _ => continue,
            }
        }
        if let Some(max) = alert.max_wind_kmh {
            match wind_sp {
                Some(v) if v <= max => {}
                _ => continue,
            }
        }
        if let Some(center) = alert.wind_dir_center {
            let tol = alert.wind_dir_tol.unwrap_or(DEFAULT_WIND_DIR_TOL);
            match wind_dir {
                Some(d) if ang_diff(d, center) <= tol => {}
                _ => continue,
            }
        }

        return Some(AlertHit {
            time: t0.clone(),
            hs,
            swell_h,
            swell_p,
            wind_speed: wind_sp,
            wind_dir,
            surf_idx: idx,
        });
    }
    None
}

/// Cooldown gate. Tracked per alert id across ALL of the alert's target
/// spots: a fire on one spot suppresses the same alert everywhere until the
/// cooldown elapses. Kept that way deliberately (see DESIGN.md).
pub fn can_fire(last_fired_ms: Option<i64>, now_ms: i64, cooldown_minutes: i64) -> bool {
    match last_fired_ms {
        None => true,
        Some(last) => now_ms - last >= cooldown_minutes * 60_000,
    }
}

/// Evaluate one alert against each of its target spots. Notification
/// delivery is best-effort; any per-spot failure is swallowed so the rest of
/// the pass continues.
pub async fn check_one_alert(
    pool: &SqlitePool,
    engine: &MergeEngine,
    notifier: &dyn Notifier,
    settings: &Settings,
    alert: &Alert,
    cache: &mut ForecastCache,
) {
    if !alert.enabled {
        return;
    }

    let mut ids = alert.spot_ids.clone();
    if ids.is_empty() {
        // No explicit targets: fall back to whichever spot is loaded.
        match store::get_last_snapshot(pool).await {
            Ok(Some(snapshot)) => ids.push(snapshot.spot.id),
            _ => return,
        }
    }

    for spot_id in &ids {
        let Some(data) = ensure_spot_data(pool, engine, settings, spot_id, cache).await else {
            continue;
        };

        let hit = match evaluate_alert(alert, &data, local_now()) {
            Some(hit) => hit,
            None => continue,
        };

        let now_ms = chrono::Utc::now().timestamp_millis();
        let last_fired = store::get_last_fired(pool, &alert.id).await.unwrap_or(None);
        if !can_fire(last_fired, now_ms, settings.alert_cooldown_minutes) {
            continue;
        }

        let title = format!("Surfcast: {}", alert.name);
        let body = hit_body(&hit, settings);
        info!("Alert '{}' hit at {} (spot {})", alert.name, hit.time, spot_id);
        let _ = notifier.notify(&title, &body).await;

        // Record the fire before moving on so a crash can't double-notify.
        if let Err(e) = store::mark_fired(pool, &alert.id, now_ms).await {
            warn!("Failed to record alert fire for {}: {}", alert.id, e);
        }
    }
}

/// Full pass: every enabled alert across its spot set, one shared forecast
/// cache so alerts sharing spots cost one fetch.
pub async fn run_all_checks(
    pool: &SqlitePool,
    engine: &MergeEngine,
    notifier: &dyn Notifier,
) -> anyhow::Result<()> {
    let alerts = store::list_alerts(pool).await?;
    if alerts.is_empty() {
        return Ok(());
    }

    let settings = store::load_settings(pool).await?;
    info!("Running alert checks ({} alerts)...", alerts.len());

    let mut cache = ForecastCache::new();
    for alert in &alerts {
        check_one_alert(pool, engine, notifier, &settings, alert, &mut cache).await;
    }

    store::set_last_check_at(pool, chrono::Utc::now().timestamp_millis()).await?;
    Ok(())
}

fn hit_body(hit: &AlertHit, settings: &Settings) -> String {
    let hs = settings.wave_unit.display(hit.hs);
    let wind = settings.speed_unit.display(hit.wind_speed);
    format!(
        "{} • Hs {}{} • swellP {}s • wind {}{}",
        hit.time.replace('T', " "),
        hs.value.map_or("—".to_string(), |v| format!("{:.1}", v)),
        hs.unit,
        hit.swell_p.map_or("—".to_string(), |v| format!("{:.0}", v)),
        wind.value.map_or("—".to_string(), |v| format!("{:.0}", v)),
        wind.unit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeseries::parse_time;
    use crate::models::{HourlySeries, ModelProvenance};

    fn forecast(hs: &[Option<f64>], wind: &[Option<f64>]) -> MergedForecast {
        let time: Vec<String> = (0..hs.len())
            .map(|i| format!("2026-08-06T{:02}:00", i))
            .collect();
        let mut marine = HourlySeries {
            time: time.clone(),
            values: Default::default(),
        };
        marine.set_var("wave_height", hs.to_vec());
        let mut weather = HourlySeries {
            time,
            values: Default::default(),
        };
        weather.set_var("wind_speed_10m", wind.to_vec());
        MergedForecast {
            marine,
            weather,
            provenance: ModelProvenance {
                wave_model: "auto".to_string(),
                requested_override: "auto".to_string(),
                merged: vec![],
            },
        }
    }

    fn alert() -> Alert {
        Alert {
            id: "a_test".to_string(),
            name: "test".to_string(),
            spot_ids: vec![],
            enabled: true,
            min_hs_m: None,
            min_swell_h_m: None,
            min_swell_p_s: None,
            min_idx: None,
            max_wind_kmh: None,
            wind_dir_center: None,
            wind_dir_tol: None,
            look_hours: 24,
            created_at: "2026-08-06T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_earliest_match_not_best_match() {
        let data = forecast(
            &[Some(1.0), Some(1.2), Some(1.5), Some(2.1), Some(1.8)],
            &[Some(0.0); 5],
        );
        let mut a = alert();
        a.min_hs_m = Some(2.0);
        a.look_hours = 5;

        let now = parse_time("2026-08-06T00:00").unwrap();
        let hit = evaluate_alert(&a, &data, now).unwrap();
        // Hour 3 is the first qualifying hour, even though it is not the max.
        assert_eq!(hit.time, "2026-08-06T03:00");
        assert_eq!(hit.hs, Some(2.1));
    }

    #[test]
    fn test_missing_required_value_skips_hour() {
        let data = forecast(
            &[Some(3.0), Some(3.0)],
            &[None, Some(5.0)],
        );
        let mut a = alert();
        a.max_wind_kmh = Some(10.0);

        let now = parse_time("2026-08-06T00:00").unwrap();
        let hit = evaluate_alert(&a, &data, now).unwrap();
        // Hour 0 has no wind value, so it cannot satisfy a wind threshold.
        assert_eq!(hit.time, "2026-08-06T01:00");
    }

    #[test]
    fn test_wind_direction_tolerance() {
        let mut data = forecast(&[Some(1.0); 3], &[Some(5.0); 3]);
        data.weather
            .set_var("wind_direction_10m", vec![Some(100.0), Some(355.0), Some(20.0)]);
        let mut a = alert();
        a.wind_dir_center = Some(0.0);
        a.wind_dir_tol = Some(30.0);

        let now = parse_time("2026-08-06T00:00").unwrap();
        let hit = evaluate_alert(&a, &data, now).unwrap();
        // 355° is 5° off north, inside the 30° tolerance; 100° is not.
        assert_eq!(hit.time, "2026-08-06T01:00");
    }

    #[test]
    fn test_all_thresholds_are_anded() {
        let mut data = forecast(&[Some(2.5), Some(2.5)], &[Some(40.0), Some(8.0)]);
        data.marine
            .set_var("swell_wave_period", vec![Some(12.0), Some(12.0)]);
        let mut a = alert();
        a.min_hs_m = Some(2.0);
        a.max_wind_kmh = Some(15.0);

        let now = parse_time("2026-08-06T00:00").unwrap();
        let hit = evaluate_alert(&a, &data, now).unwrap();
        // Hour 0 passes the wave floor but fails the wind ceiling.
        assert_eq!(hit.time, "2026-08-06T01:00");
    }

    #[test]
    fn test_no_hit_outside_look_window() {
        let data = forecast(
            &[Some(1.0), Some(1.0), Some(1.0), Some(5.0)],
            &[Some(0.0); 4],
        );
        let mut a = alert();
        a.min_hs_m = Some(2.0);
        a.look_hours = 2;

        let now = parse_time("2026-08-06T00:00").unwrap();
        assert!(evaluate_alert(&a, &data, now).is_none());
    }

    #[test]
    fn test_cooldown_gate() {
        let cooldown_min = 180;
        let t0: i64 = 1_700_000_000_000;
        assert!(can_fire(None, t0, cooldown_min));
        // Fired at t0: suppressed for the same alert id regardless of spot.
        assert!(!can_fire(Some(t0), t0 + 1, cooldown_min));
        assert!(!can_fire(Some(t0), t0 + 179 * 60_000, cooldown_min));
        assert!(can_fire(Some(t0), t0 + 180 * 60_000, cooldown_min));
    }
}
