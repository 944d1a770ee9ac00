use serde::Serialize;

/// Smallest absolute difference between two angles, in degrees (0–180).
pub fn ang_diff(a: f64, b: f64) -> f64 {
    ((a - b + 540.0).rem_euclid(360.0) - 180.0).abs()
}

const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass label, or "—" for a missing direction.
pub fn deg_to_cardinal(deg: Option<f64>) -> &'static str {
    let Some(deg) = deg.filter(|d| d.is_finite()) else {
        return "—";
    };
    let i = ((deg.rem_euclid(360.0) / 22.5).round() as usize) % 16;
    CARDINALS[i]
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WindRelation {
    Offshore,
    Onshore,
    Side,
}

/// Classify the wind against the spot's shore-facing direction. Wind
/// direction is meteorological (where the wind blows FROM); `face_deg` is
/// where breaking waves travel toward. Wind from the land side (face + 180°)
/// is offshore. Undefined when either direction is unknown.
pub fn wind_relation(wind_dir: Option<f64>, face_deg: Option<f64>) -> Option<WindRelation> {
    let wind = wind_dir.filter(|d| d.is_finite())?;
    let face = face_deg.filter(|d| d.is_finite())?;

    let offshore_dir = (face + 180.0).rem_euclid(360.0);
    if ang_diff(wind, offshore_dir) <= 45.0 {
        return Some(WindRelation::Offshore);
    }
    if ang_diff(wind, face) <= 45.0 {
        return Some(WindRelation::Onshore);
    }
    Some(WindRelation::Side)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ang_diff_wraps() {
        assert_eq!(ang_diff(350.0, 10.0), 20.0);
        assert_eq!(ang_diff(10.0, 350.0), 20.0);
        assert_eq!(ang_diff(0.0, 180.0), 180.0);
        assert_eq!(ang_diff(90.0, 90.0), 0.0);
    }

    #[test]
    fn test_wind_relation_south_facing() {
        // Spot faces 180° (waves travel south); offshore wind comes from 0°.
        assert_eq!(
            wind_relation(Some(0.0), Some(180.0)),
            Some(WindRelation::Offshore)
        );
        assert_eq!(
            wind_relation(Some(180.0), Some(180.0)),
            Some(WindRelation::Onshore)
        );
        assert_eq!(
            wind_relation(Some(90.0), Some(180.0)),
            Some(WindRelation::Side)
        );
    }

    #[test]
    fn test_wind_relation_unknown_face() {
        assert_eq!(wind_relation(Some(0.0), None), None);
        assert_eq!(wind_relation(None, Some(180.0)), None);
    }

    #[test]
    fn test_cardinal_labels() {
        assert_eq!(deg_to_cardinal(Some(0.0)), "N");
        assert_eq!(deg_to_cardinal(Some(359.0)), "N");
        assert_eq!(deg_to_cardinal(Some(225.0)), "SW");
        assert_eq!(deg_to_cardinal(None), "—");
    }
}
