use serde::Serialize;

use crate::core::timeseries::parse_time;

// Sea-level extrema from the hourly sea_level_height_msl series. This is an
// approximation built on model sea level, not a tidal-harmonics prediction;
// anything user-facing must carry that caveat and it is never a basis for
// navigation decisions.

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum TideKind {
    High,
    Low,
}

#[derive(Debug, Serialize, Clone)]
pub struct TideEvent {
    pub kind: TideKind,
    pub time: String,
    /// Sea level height relative to MSL, meters.
    pub height_m: f64,
}

/// Two real extrema are never closer than ~6 h; anything nearer is model
/// noise around one event, so keep the earlier.
const DEDUP_WINDOW_SECS: i64 = (2.5 * 3600.0) as i64;

const MAX_EVENTS: usize = 6;

/// Scan an aligned timestamp+sea-level window for local extrema using a
/// 3-point neighborhood. Points next to a missing value are skipped.
pub fn detect_tides(times: &[String], sea: &[Option<f64>]) -> Vec<TideEvent> {
    let n = times.len().min(sea.len());
    if n < 5 {
        return Vec::new();
    }

    let mut raw = Vec::new();
    for i in 1..n - 1 {
        let (Some(a), Some(b), Some(c)) = (sea[i - 1], sea[i], sea[i + 1]) else {
            continue;
        };
        if !(a.is_finite() && b.is_finite() && c.is_finite()) {
            continue;
        }
        if b > a && b > c {
            raw.push(TideEvent {
                kind: TideKind::High,
                time: times[i].clone(),
                height_m: b,
            });
        }
        if b < a && b < c {
            raw.push(TideEvent {
                kind: TideKind::Low,
                time: times[i].clone(),
                height_m: b,
            });
        }
    }

    // Dominant-extremum de-duplication, in scan order.
    let mut events = Vec::new();
    let mut last_accepted: Option<i64> = None;
    for e in raw {
        let Some(t) = parse_time(&e.time) else {
            continue;
        };
        let secs = t.and_utc().timestamp();
        if let Some(last) = last_accepted {
            if secs - last < DEDUP_WINDOW_SECS {
                continue;
            }
        }
        last_accepted = Some(secs);
        events.push(e);
        if events.len() >= MAX_EVENTS {
            break;
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("2026-08-06T{:02}:00", i))
            .collect()
    }

    #[test]
    fn test_detects_high_and_low() {
        let times = axis(7);
        let sea = vec![
            Some(0.1),
            Some(0.5),
            Some(0.2),
            Some(-0.3),
            Some(-0.6),
            Some(-0.2),
            Some(0.0),
        ];
        let events = detect_tides(&times, &sea);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, TideKind::High);
        assert_eq!(events[0].time, "2026-08-06T01:00");
        assert_eq!(events[1].kind, TideKind::Low);
        assert_eq!(events[1].time, "2026-08-06T04:00");
    }

    #[test]
    fn test_close_extrema_collapse_to_earlier() {
        // Extrema at hours 1 and 2: within 2.5 h, the earlier one wins.
        let times = axis(5);
        let sea = vec![Some(0.0), Some(0.5), Some(0.1), Some(0.4), Some(0.0)];
        let events = detect_tides(&times, &sea);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time, "2026-08-06T01:00");
    }

    #[test]
    fn test_extrema_three_hours_apart_stay_distinct() {
        let times = axis(6);
        let sea = vec![
            Some(0.0),
            Some(0.5),
            Some(0.2),
            Some(0.1),
            Some(0.6),
            Some(0.0),
        ];
        let events = detect_tides(&times, &sea);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].time, "2026-08-06T01:00");
        assert_eq!(events[1].time, "2026-08-06T04:00");
    }

    #[test]
    fn test_missing_neighbor_skips_point() {
        let times = axis(5);
        let sea = vec![Some(0.0), Some(0.5), None, Some(0.4), Some(0.0)];
        // Hour 1 has a missing right neighbor, hour 3 a missing left one.
        assert!(detect_tides(&times, &sea).is_empty());
    }

    #[test]
    fn test_short_window_yields_nothing() {
        let times = axis(4);
        let sea = vec![Some(0.0), Some(0.5), Some(0.1), Some(0.0)];
        assert!(detect_tides(&times, &sea).is_empty());
    }

    #[test]
    fn test_caps_at_six_events() {
        // Alternating extrema every 3 hours, more than six of them.
        let times: Vec<String> = (0..30)
            .map(|i| {
                format!(
                    "2026-08-{:02}T{:02}:00",
                    6 + (i * 3) / 24,
                    (i * 3) % 24
                )
            })
            .collect();
        let sea: Vec<Option<f64>> = (0..30)
            .map(|i| Some(if i % 2 == 0 { 0.5 } else { -0.5 }))
            .collect();
        let events = detect_tides(&times, &sea);
        assert_eq!(events.len(), 6);
    }
}
