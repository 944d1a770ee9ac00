use chrono::NaiveDateTime;
use serde::Serialize;

use crate::analysis::surf::{surf_badge, surf_index, surf_stars};
use crate::analysis::tides::{detect_tides, TideEvent};
use crate::analysis::wind::{deg_to_cardinal, wind_relation, WindRelation};
use crate::core::timeseries::{build_index, now_index_at};
use crate::models::{MergedForecast, Settings, Spot};
use crate::units::DisplayValue;

// The render hand-off: everything the dashboard shows for the current hour,
// already unit-converted. The rendering layer only places these values.

/// Tide events are scanned over the next ~60 hours from the current hour.
const TIDE_SCAN_HOURS: usize = 60;

pub const TIDE_NOTE: &str =
    "Approximate, derived from modeled sea level. Not for navigation.";

#[derive(Debug, Serialize, Clone)]
pub struct TideEventView {
    pub kind: String,
    pub time: String,
    pub height: DisplayValue,
}

#[derive(Debug, Serialize, Clone)]
pub struct SpotSummary {
    pub place: String,
    pub wave_height: DisplayValue,
    pub wave_period_s: Option<f64>,
    pub wave_dir_deg: Option<f64>,
    pub wave_dir_cardinal: &'static str,
    pub wind_sea_height: DisplayValue,
    pub swell_height: DisplayValue,
    pub swell_period_s: Option<f64>,
    pub swell_dir_deg: Option<f64>,
    pub swell_dir_cardinal: &'static str,
    pub wind_speed: DisplayValue,
    pub wind_dir_deg: Option<f64>,
    pub wind_dir_cardinal: &'static str,
    pub wind_gust: DisplayValue,
    pub wind_relation: Option<WindRelation>,
    /// Sea level uses the wave length unit, labeled relative to MSL.
    pub sea_level: DisplayValue,
    pub sea_surface_temp: DisplayValue,
    pub tide_events: Vec<TideEventView>,
    pub tide_note: &'static str,
    pub surf_index: Option<f64>,
    pub surf_badge: Option<&'static str>,
    pub surf_stars: u8,
    /// "Wave model: <id>" plus the merged variable groups, if any.
    pub model_line: String,
}

pub fn build_summary(
    spot: &Spot,
    data: &MergedForecast,
    settings: &Settings,
    now: NaiveDateTime,
) -> SpotSummary {
    let m = &data.marine;
    let w = &data.weather;
    let mt = &m.time;
    let wi = build_index(&w.time);

    let i_now = now_index_at(mt, now);
    let j_now = mt.get(i_now).and_then(|t| wi.get(t)).copied();

    let hs = m.value_at("wave_height", i_now);
    let per = m.value_at("wave_period", i_now);
    let dir = m.value_at("wave_direction", i_now);

    let swell_h = m.value_at("swell_wave_height", i_now);
    let swell_p = m.value_at("swell_wave_period", i_now);
    let swell_d = m.value_at("swell_wave_direction", i_now);

    let wind_sea_h = m.value_at("wind_wave_height", i_now);

    let sea = m.value_at("sea_level_height_msl", i_now);
    let sst = m.value_at("sea_surface_temperature", i_now);

    let wind_sp = j_now.and_then(|j| w.value_at("wind_speed_10m", j));
    let wind_dir = j_now.and_then(|j| w.value_at("wind_direction_10m", j));
    let gust = j_now.and_then(|j| w.value_at("wind_gusts_10m", j));

    let idx = surf_index(hs, swell_p);

    let tide_events = tide_window(data, i_now)
        .into_iter()
        .map(|e| TideEventView {
            kind: format!("{:?}", e.kind),
            time: e.time,
            height: settings.wave_unit.display(Some(e.height_m)),
        })
        .collect();

    let prov = &data.provenance;
    let model_line = if prov.merged.is_empty() {
        format!("Wave model: {}", prov.wave_model)
    } else {
        format!(
            "Wave model: {} • merged: {}",
            prov.wave_model,
            prov.merged.join(", ")
        )
    };

    SpotSummary {
        place: spot.place_label(),
        wave_height: settings.wave_unit.display(hs),
        wave_period_s: per,
        wave_dir_deg: dir,
        wave_dir_cardinal: deg_to_cardinal(dir),
        wind_sea_height: settings.wave_unit.display(wind_sea_h),
        swell_height: settings.wave_unit.display(swell_h),
        swell_period_s: swell_p,
        swell_dir_deg: swell_d,
        swell_dir_cardinal: deg_to_cardinal(swell_d),
        wind_speed: settings.speed_unit.display(wind_sp),
        wind_dir_deg: wind_dir,
        wind_dir_cardinal: deg_to_cardinal(wind_dir),
        wind_gust: settings.speed_unit.display(gust),
        wind_relation: wind_relation(wind_dir, spot.face_deg),
        sea_level: settings.wave_unit.display(sea),
        sea_surface_temp: settings.temp_unit.display(sst),
        tide_events,
        tide_note: TIDE_NOTE,
        surf_index: idx,
        surf_badge: surf_badge(idx),
        surf_stars: surf_stars(idx),
        model_line,
    }
}

fn tide_window(data: &MergedForecast, i_now: usize) -> Vec<TideEvent> {
    let mt = &data.marine.time;
    let end = (i_now + TIDE_SCAN_HOURS).min(mt.len());
    let times = &mt[i_now..end];
    let sea: Vec<Option<f64>> = (i_now..end)
        .map(|i| data.marine.value_at("sea_level_height_msl", i))
        .collect();
    detect_tides(times, &sea)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeseries::parse_time;
    use crate::models::{HourlySeries, ModelProvenance};
    use crate::units::WaveUnit;

    fn two_hour_forecast() -> MergedForecast {
        let time: Vec<String> = vec!["2026-08-06T00:00".into(), "2026-08-06T01:00".into()];
        let mut marine = HourlySeries {
            time: time.clone(),
            values: Default::default(),
        };
        marine.set_var("wave_height", vec![Some(1.5), Some(1.8)]);
        marine.set_var("swell_wave_period", vec![Some(10.0), Some(11.0)]);
        let mut weather = HourlySeries {
            time,
            values: Default::default(),
        };
        weather.set_var("wind_speed_10m", vec![Some(15.0), Some(18.0)]);
        weather.set_var("wind_direction_10m", vec![Some(0.0), Some(10.0)]);
        MergedForecast {
            marine,
            weather,
            provenance: ModelProvenance {
                wave_model: "auto".to_string(),
                requested_override: "auto".to_string(),
                merged: vec!["SST".to_string()],
            },
        }
    }

    #[test]
    fn test_summary_converts_and_classifies() {
        let mut spot = Spot::new("Testa", 20.0, -105.0);
        spot.face_deg = Some(180.0);
        let settings = Settings {
            wave_unit: WaveUnit::Feet,
            ..Settings::default()
        };
        let now = parse_time("2026-08-06T00:10").unwrap();

        let summary = build_summary(&spot, &two_hour_forecast(), &settings, now);

        let hs_ft = summary.wave_height.value.unwrap();
        assert!((hs_ft - 1.5 * 3.28084).abs() < 1e-6);
        assert_eq!(summary.wave_height.unit, "ft");
        assert_eq!(summary.surf_index, Some(22.5));
        assert_eq!(summary.surf_badge, Some("Firing"));
        // Wind from 0° onto a south-facing spot blows from the land side.
        assert_eq!(summary.wind_relation, Some(WindRelation::Offshore));
        assert_eq!(summary.model_line, "Wave model: auto • merged: SST");
    }

    #[test]
    fn test_summary_missing_weather_hour() {
        let mut data = two_hour_forecast();
        // Weather axis that shares no timestamps with the marine axis.
        data.weather.time = vec!["2026-08-07T00:00".into(), "2026-08-07T01:00".into()];
        let spot = Spot::new("Testa", 20.0, -105.0);
        let now = parse_time("2026-08-06T00:10").unwrap();

        let summary = build_summary(&spot, &data, &Settings::default(), now);
        assert_eq!(summary.wind_speed.value, None);
        assert_eq!(summary.wind_relation, None);
        // Marine values are untouched by the missing weather hour.
        assert_eq!(summary.surf_index, Some(22.5));
    }
}
