use once_cell::sync::Lazy;
use serde::Serialize;

// Which wave models can be requested explicitly, and which models back-fill
// the extras groups, is configuration. The merge engine takes whatever id the
// settings carry; enumeration lives only here.

pub const AUTO_MODEL: &str = "auto";

/// Explicit model used to back-fill sea-surface temperature when the base
/// model has none.
pub const SST_FALLBACK_MODEL: &str = "meteofrance_sea_surface_temperature";

/// Explicit model used to back-fill ocean current velocity/direction.
pub const CURRENTS_FALLBACK_MODEL: &str = "meteofrance_currents";

#[derive(Debug, Clone, Serialize)]
pub struct WaveModel {
    pub id: String,
    pub name: String,
}

fn model(id: &str, name: &str) -> WaveModel {
    WaveModel {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub static WAVE_MODELS: Lazy<Vec<WaveModel>> = Lazy::new(|| {
    vec![
        model(AUTO_MODEL, "Best match"),
        model("ncep_gfswave025", "NOAA GFS Wave 0.25°"),
        model("ecmwf_wam025", "ECMWF WAM 0.25°"),
        model("meteofrance_wave", "Météo-France MFWAM"),
        model("dwd_gwam", "DWD GWAM"),
        model("dwd_ewam", "DWD EWAM"),
    ]
});

pub fn is_known_model(id: &str) -> bool {
    WAVE_MODELS.iter().any(|m| m.id == id)
}
