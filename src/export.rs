use chrono::NaiveDateTime;

use crate::core::timeseries::{build_index, now_index_at};
use crate::models::MergedForecast;

// Tabular hand-off for an external CSV writer. Rows are canonical units
// (meters, km/h, °C) regardless of the display settings; a missing value is
// an empty cell, never zero.

pub const EXPORT_COLUMNS: &[&str] = &[
    "time",
    "hs_m",
    "period_s",
    "dir_deg",
    "swell_h_m",
    "swell_p_s",
    "swell_dir_deg",
    "wind_kmh",
    "wind_dir_deg",
    "gust_kmh",
    "sea_level_m",
    "sst_c",
    "current_kmh",
    "current_dir_deg",
];

fn cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Fixed-column rows (header first) covering `range_hours` from the current
/// hour. Weather cells resolve through the weather axis; an hour the weather
/// axis does not carry exports empty wind cells.
pub fn forecast_rows(
    data: &MergedForecast,
    range_hours: usize,
    now: NaiveDateTime,
) -> Vec<Vec<String>> {
    let m = &data.marine;
    let w = &data.weather;
    let mt = &m.time;
    let wi = build_index(&w.time);

    let i_now = now_index_at(mt, now);
    let end = (i_now + range_hours).min(mt.len());

    let mut rows = Vec::with_capacity(end - i_now + 1);
    rows.push(EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect());

    for i in i_now..end {
        let t0 = &mt[i];
        let j = wi.get(t0).copied();
        rows.push(vec![
            t0.clone(),
            cell(m.value_at("wave_height", i)),
            cell(m.value_at("wave_period", i)),
            cell(m.value_at("wave_direction", i)),
            cell(m.value_at("swell_wave_height", i)),
            cell(m.value_at("swell_wave_period", i)),
            cell(m.value_at("swell_wave_direction", i)),
            cell(j.and_then(|j| w.value_at("wind_speed_10m", j))),
            cell(j.and_then(|j| w.value_at("wind_direction_10m", j))),
            cell(j.and_then(|j| w.value_at("wind_gusts_10m", j))),
            cell(m.value_at("sea_level_height_msl", i)),
            cell(m.value_at("sea_surface_temperature", i)),
            cell(m.value_at("ocean_current_velocity", i)),
            cell(m.value_at("ocean_current_direction", i)),
        ]);
    }
    rows
}

/// Join rows into CSV text, quoting a cell only when it contains a quote,
/// comma or newline.
pub fn to_csv(rows: &[Vec<String>]) -> String {
    fn esc(s: &str) -> String {
        if s.contains('"') || s.contains(',') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }

    rows.iter()
        .map(|r| r.iter().map(|c| esc(c)).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join("\n")
}
