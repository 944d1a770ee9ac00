use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

use crate::units::{SpeedUnit, TempUnit, WaveUnit};

/// A surfable location. The id is derived from the coordinates so the same
/// point always resolves to the same spot, whether it came from search, GPS,
/// a map pin or a favorite.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Spot {
    pub id: String,
    pub name: String,
    pub admin1: Option<String>,
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Shore-facing direction in degrees (where breaking waves travel toward).
    /// None when the user has not set an orientation.
    pub face_deg: Option<f64>,
}

impl Spot {
    pub fn coord_id(lat: f64, lon: f64) -> String {
        format!("{:.4},{:.4}", lat, lon)
    }

    pub fn new(name: &str, lat: f64, lon: f64) -> Self {
        Spot {
            id: Self::coord_id(lat, lon),
            name: name.to_string(),
            admin1: None,
            country: None,
            lat,
            lon,
            face_deg: None,
        }
    }

    /// "Name, Region, Country" with empty parts skipped.
    pub fn place_label(&self) -> String {
        let mut parts = vec![self.name.clone()];
        if let Some(a) = &self.admin1 {
            if !a.is_empty() {
                parts.push(a.clone());
            }
        }
        if let Some(c) = &self.country {
            if !c.is_empty() {
                parts.push(c.clone());
            }
        }
        parts.join(", ")
    }
}

/// One geocoding search result, as returned by the geocoding provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeocodeResult {
    pub name: String,
    pub admin1: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeocodeResult {
    pub fn to_spot(&self) -> Spot {
        Spot {
            id: Spot::coord_id(self.latitude, self.longitude),
            name: self.name.clone(),
            admin1: self.admin1.clone(),
            country: self.country.clone(),
            lat: self.latitude,
            lon: self.longitude,
            face_deg: None,
        }
    }
}

/// Hourly time series as one shared timestamp axis plus named per-variable
/// value columns. All columns are kept at the axis length; a value that was
/// absent or non-numeric in the provider response is None and stays None
/// through every downstream computation.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub values: HashMap<String, Vec<Option<f64>>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn var(&self, name: &str) -> Option<&[Option<f64>]> {
        self.values.get(name).map(|v| v.as_slice())
    }

    /// Value of `name` at `idx`, or None when the column is absent, the index
    /// is out of range, or the stored value is missing/non-finite.
    pub fn value_at(&self, name: &str, idx: usize) -> Option<f64> {
        self.values
            .get(name)
            .and_then(|v| v.get(idx))
            .copied()
            .flatten()
            .filter(|x| x.is_finite())
    }

    /// Insert or replace a column, normalized to the axis length.
    pub fn set_var(&mut self, name: &str, mut values: Vec<Option<f64>>) {
        values.resize(self.time.len(), None);
        self.values.insert(name.to_string(), values);
    }

    pub fn any_finite(&self, name: &str) -> bool {
        self.values
            .get(name)
            .map(|v| v.iter().any(|x| x.map_or(false, |x| x.is_finite())))
            .unwrap_or(false)
    }
}

/// Which model actually supplied the wave variables, and which variable
/// groups were back-filled from a secondary provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelProvenance {
    /// Model that supplied the wave family ("auto" unless an override took).
    pub wave_model: String,
    /// Override the user asked for, whether or not it took.
    pub requested_override: String,
    /// Variable groups spliced in from fallback providers ("SST", "Currents").
    pub merged: Vec<String>,
}

/// One load operation's output: marine and weather hourly series on their own
/// timestamp axes, plus provenance. Immutable once produced; a new load
/// replaces it wholesale.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MergedForecast {
    pub marine: HourlySeries,
    pub weather: HourlySeries,
    pub provenance: ModelProvenance,
}

/// A threshold alert. Every threshold is optional; the defined ones must all
/// pass on the same hour (logical AND).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Alert {
    pub id: String,
    pub name: String,
    /// Target spot ids. Empty means "whichever spot is loaded at check time".
    pub spot_ids: Vec<String>,
    pub enabled: bool,
    pub min_hs_m: Option<f64>,
    pub min_swell_h_m: Option<f64>,
    pub min_swell_p_s: Option<f64>,
    pub min_idx: Option<f64>,
    pub max_wind_kmh: Option<f64>,
    pub wind_dir_center: Option<f64>,
    pub wind_dir_tol: Option<f64>,
    pub look_hours: i64,
    pub created_at: String,
}

impl Alert {
    pub fn generate_id() -> String {
        use rand::Rng;
        let r: u64 = rand::thread_rng().gen();
        format!("a_{:x}{:x}", r, chrono::Utc::now().timestamp_millis())
    }
}

/// The hour that satisfied an alert, with the raw canonical values that made
/// it pass (for building the notification body).
#[derive(Debug, Serialize, Clone)]
pub struct AlertHit {
    pub time: String,
    pub hs: Option<f64>,
    pub swell_h: Option<f64>,
    pub swell_p: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_dir: Option<f64>,
    pub surf_idx: Option<f64>,
}

/// Alert engine bookkeeping, persisted across sessions.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AlertRuntime {
    /// alert id -> last fired, milliseconds since epoch
    pub last_fired: HashMap<String, i64>,
    pub last_check_at_ms: i64,
}

/// User settings. Unknown/missing fields fall back to defaults on load so an
/// older persisted record keeps working after an upgrade.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub wave_unit: WaveUnit,
    pub speed_unit: SpeedUnit,
    pub temp_unit: TempUnit,
    /// IANA timezone name, or "auto" to let the provider resolve it.
    pub timezone: String,
    /// Wave model id from the registry, or "auto" for the provider's best match.
    pub wave_model: String,
    /// Whether missing SST/current columns may be back-filled from fallback providers.
    pub merge_extras: bool,
    pub alert_check_minutes: i64,
    pub alert_cooldown_minutes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            wave_unit: WaveUnit::Meters,
            speed_unit: SpeedUnit::Kmh,
            temp_unit: TempUnit::Celsius,
            timezone: "auto".to_string(),
            wave_model: "auto".to_string(),
            merge_extras: true,
            alert_check_minutes: 30,
            alert_cooldown_minutes: 180,
        }
    }
}

/// The last successfully loaded forecast, kept so a restart (and the alert
/// pass) can reuse it without refetching.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LastSnapshot {
    pub spot: Spot,
    pub data: MergedForecast,
    pub fetched_at: String,
}
