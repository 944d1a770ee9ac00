use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::models::{Alert, AlertRuntime, LastSnapshot, Settings, Spot};

// All persisted state goes through here: favorites, alerts, settings, the
// alert runtime record and the last-loaded snapshot. Writes happen only
// after a fully-assembled value exists, so a failed operation never leaves a
// partial record behind.

const MAX_FAVORITES: i64 = 120;
const MAX_ALERTS: i64 = 250;

const SETTINGS_KEY: &str = "settings";
const LAST_SNAPSHOT_KEY: &str = "last_snapshot";
const LAST_CHECK_AT_KEY: &str = "last_check_at_ms";

pub async fn init(data_dir: &Path) -> Result<SqlitePool> {
    let db_path = data_dir.join("surfcast.db");
    let database_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());

    info!("Connecting to SQLite database: {}", database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("Database initialized.");
    Ok(pool)
}

/// In-memory database with the same schema, for tests.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

// ---- settings ----

pub async fn save_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES ($1, $2)
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<String> {
    let row = sqlx::query("SELECT value FROM settings WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(record) => Ok(record.try_get("value").unwrap_or_default()),
        None => Ok("".to_string()),
    }
}

/// Load settings, merging missing fields onto defaults so records written by
/// an older version keep working.
pub async fn load_settings(pool: &SqlitePool) -> Result<Settings> {
    let raw = get_setting(pool, SETTINGS_KEY).await?;
    if raw.is_empty() {
        return Ok(Settings::default());
    }
    Ok(serde_json::from_str(&raw).unwrap_or_default())
}

pub async fn save_settings(pool: &SqlitePool, settings: &Settings) -> Result<()> {
    let mut s = settings.clone();
    s.alert_check_minutes = s.alert_check_minutes.clamp(5, 180);
    s.alert_cooldown_minutes = s.alert_cooldown_minutes.clamp(30, 1440);
    save_setting(pool, SETTINGS_KEY, &serde_json::to_string(&s)?).await
}

// ---- favorites ----

pub async fn list_favorites(pool: &SqlitePool) -> Result<Vec<Spot>> {
    let rows = sqlx::query_as::<_, Spot>(
        "SELECT id, name, admin1, country, lat, lon, face_deg
         FROM favorites ORDER BY position ASC LIMIT $1",
    )
    .bind(MAX_FAVORITES)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_favorite(pool: &SqlitePool, id: &str) -> Result<Option<Spot>> {
    let row = sqlx::query_as::<_, Spot>(
        "SELECT id, name, admin1, country, lat, lon, face_deg FROM favorites WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn is_favorite(pool: &SqlitePool, id: &str) -> Result<bool> {
    Ok(get_favorite(pool, id).await?.is_some())
}

/// Insert at the front of the list; the oldest entries beyond the cap fall
/// off.
pub async fn add_favorite(pool: &SqlitePool, spot: &Spot) -> Result<()> {
    let min_pos: Option<i64> = sqlx::query("SELECT MIN(position) as p FROM favorites")
        .fetch_one(pool)
        .await?
        .try_get("p")
        .ok();
    let position = min_pos.unwrap_or(0) - 1;

    sqlx::query(
        "INSERT INTO favorites (id, name, admin1, country, lat, lon, face_deg, position)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name, admin1 = EXCLUDED.admin1, country = EXCLUDED.country,
            lat = EXCLUDED.lat, lon = EXCLUDED.lon, face_deg = EXCLUDED.face_deg",
    )
    .bind(&spot.id)
    .bind(&spot.name)
    .bind(&spot.admin1)
    .bind(&spot.country)
    .bind(spot.lat)
    .bind(spot.lon)
    .bind(spot.face_deg)
    .bind(position)
    .execute(pool)
    .await?;

    sqlx::query(
        "DELETE FROM favorites WHERE id NOT IN
         (SELECT id FROM favorites ORDER BY position ASC LIMIT $1)",
    )
    .bind(MAX_FAVORITES)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove_favorite(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM favorites WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Attach or clear a spot's shore-facing direction. A given direction is
/// normalized into [0, 360).
pub async fn set_face_deg(pool: &SqlitePool, id: &str, face_deg: Option<f64>) -> Result<()> {
    let normalized = face_deg.map(|d| d.rem_euclid(360.0));
    sqlx::query("UPDATE favorites SET face_deg = $1 WHERE id = $2")
        .bind(normalized)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ---- alerts ----

fn alert_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Alert> {
    let spot_ids_raw: String = row.try_get("spot_ids")?;
    Ok(Alert {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        spot_ids: serde_json::from_str(&spot_ids_raw).unwrap_or_default(),
        enabled: row.try_get("enabled")?,
        min_hs_m: row.try_get("min_hs_m")?,
        min_swell_h_m: row.try_get("min_swell_h_m")?,
        min_swell_p_s: row.try_get("min_swell_p_s")?,
        min_idx: row.try_get("min_idx")?,
        max_wind_kmh: row.try_get("max_wind_kmh")?,
        wind_dir_center: row.try_get("wind_dir_center")?,
        wind_dir_tol: row.try_get("wind_dir_tol")?,
        look_hours: row.try_get("look_hours")?,
        created_at: row.try_get("created_at")?,
    })
}

pub async fn list_alerts(pool: &SqlitePool) -> Result<Vec<Alert>> {
    let rows = sqlx::query("SELECT * FROM alerts ORDER BY created_at DESC LIMIT $1")
        .bind(MAX_ALERTS)
        .fetch_all(pool)
        .await?;
    rows.iter().map(alert_from_row).collect()
}

pub async fn save_alert(pool: &SqlitePool, alert: &Alert) -> Result<()> {
    sqlx::query(
        "INSERT INTO alerts (id, name, spot_ids, enabled, min_hs_m, min_swell_h_m,
            min_swell_p_s, min_idx, max_wind_kmh, wind_dir_center, wind_dir_tol,
            look_hours, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name, spot_ids = EXCLUDED.spot_ids, enabled = EXCLUDED.enabled,
            min_hs_m = EXCLUDED.min_hs_m, min_swell_h_m = EXCLUDED.min_swell_h_m,
            min_swell_p_s = EXCLUDED.min_swell_p_s, min_idx = EXCLUDED.min_idx,
            max_wind_kmh = EXCLUDED.max_wind_kmh, wind_dir_center = EXCLUDED.wind_dir_center,
            wind_dir_tol = EXCLUDED.wind_dir_tol, look_hours = EXCLUDED.look_hours",
    )
    .bind(&alert.id)
    .bind(&alert.name)
    .bind(serde_json::to_string(&alert.spot_ids)?)
    .bind(alert.enabled)
    .bind(alert.min_hs_m)
    .bind(alert.min_swell_h_m)
    .bind(alert.min_swell_p_s)
    .bind(alert.min_idx)
    .bind(alert.max_wind_kmh)
    .bind(alert.wind_dir_center)
    .bind(alert.wind_dir_tol)
    .bind(alert.look_hours.clamp(1, 192))
    .bind(&alert.created_at)
    .execute(pool)
    .await?;

    // Newest-first cap, like the favorites one.
    sqlx::query(
        "DELETE FROM alerts WHERE id NOT IN
         (SELECT id FROM alerts ORDER BY created_at DESC LIMIT $1)",
    )
    .bind(MAX_ALERTS)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_alert(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM alerts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM alert_runtime WHERE alert_id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_alert_enabled(pool: &SqlitePool, id: &str, enabled: bool) -> Result<()> {
    sqlx::query("UPDATE alerts SET enabled = $1 WHERE id = $2")
        .bind(enabled)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ---- alert runtime ----

pub async fn get_last_fired(pool: &SqlitePool, alert_id: &str) -> Result<Option<i64>> {
    let row = sqlx::query("SELECT last_fired_ms FROM alert_runtime WHERE alert_id = $1")
        .bind(alert_id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(record) => Ok(Some(record.try_get("last_fired_ms")?)),
        None => Ok(None),
    }
}

pub async fn mark_fired(pool: &SqlitePool, alert_id: &str, now_ms: i64) -> Result<()> {
    sqlx::query(
        "INSERT INTO alert_runtime (alert_id, last_fired_ms) VALUES ($1, $2)
         ON CONFLICT (alert_id) DO UPDATE SET last_fired_ms = EXCLUDED.last_fired_ms",
    )
    .bind(alert_id)
    .bind(now_ms)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_last_check_at(pool: &SqlitePool, now_ms: i64) -> Result<()> {
    save_setting(pool, LAST_CHECK_AT_KEY, &now_ms.to_string()).await
}

pub async fn load_alert_runtime(pool: &SqlitePool) -> Result<AlertRuntime> {
    let mut runtime = AlertRuntime::default();
    let rows = sqlx::query("SELECT alert_id, last_fired_ms FROM alert_runtime")
        .fetch_all(pool)
        .await?;
    for row in rows {
        let id: String = row.try_get("alert_id")?;
        let ms: i64 = row.try_get("last_fired_ms")?;
        runtime.last_fired.insert(id, ms);
    }
    runtime.last_check_at_ms = get_setting(pool, LAST_CHECK_AT_KEY)
        .await?
        .parse()
        .unwrap_or(0);
    Ok(runtime)
}

// ---- last-loaded snapshot ----

pub async fn save_last_snapshot(pool: &SqlitePool, snapshot: &LastSnapshot) -> Result<()> {
    save_setting(pool, LAST_SNAPSHOT_KEY, &serde_json::to_string(snapshot)?).await
}

pub async fn get_last_snapshot(pool: &SqlitePool) -> Result<Option<LastSnapshot>> {
    let raw = get_setting(pool, LAST_SNAPSHOT_KEY).await?;
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str(&raw).ok())
}
