use chrono::{Local, NaiveDateTime};
use std::collections::HashMap;

// The marine and weather providers return independent hourly axes, so every
// cross-series read goes timestamp -> weather index through a lookup built
// here, never by assuming equal integer offsets.

/// Lookup from timestamp string to its position in the axis.
pub fn build_index(times: &[String]) -> HashMap<String, usize> {
    let mut m = HashMap::with_capacity(times.len());
    for (i, t) in times.iter().enumerate() {
        m.insert(t.clone(), i);
    }
    m
}

/// Parse a provider timestamp. Open-Meteo returns zone-less local times like
/// "2026-08-06T14:00"; some providers append seconds.
pub fn parse_time(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Index of the timestamp nearest to `now`; ties and unparsable entries keep
/// the first best seen. This anchors every "current hour" display and the
/// start of every look-ahead window.
pub fn now_index_at(times: &[String], now: NaiveDateTime) -> usize {
    let mut best = 0;
    let mut best_diff = i64::MAX;
    for (i, t) in times.iter().enumerate() {
        let Some(parsed) = parse_time(t) else {
            continue;
        };
        let diff = (parsed - now).num_seconds().abs();
        if diff < best_diff {
            best_diff = diff;
            best = i;
        }
    }
    best
}

pub fn now_index(times: &[String]) -> usize {
    now_index_at(times, local_now())
}

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
