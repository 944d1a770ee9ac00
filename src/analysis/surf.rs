use once_cell::sync::Lazy;

/// Surf index: Hs² × primary swell period. A deliberately simple energy
/// proxy, not a physical model; missing inputs make the index missing.
pub fn surf_index(hs_m: Option<f64>, swell_period_s: Option<f64>) -> Option<f64> {
    let hs = hs_m.filter(|x| x.is_finite())?;
    let p = swell_period_s.filter(|x| x.is_finite())?;
    Some(hs * hs * p)
}

/// Qualitative band cut points. These are tuning knobs, not physics; adjust
/// freely without touching the classification logic.
#[derive(Debug, Clone)]
pub struct RatingBand {
    pub below: f64,
    pub label: &'static str,
}

static BADGE_BANDS: Lazy<Vec<RatingBand>> = Lazy::new(|| {
    vec![
        RatingBand { below: 4.0, label: "Small" },
        RatingBand { below: 10.0, label: "Okay" },
        RatingBand { below: 20.0, label: "Good" },
    ]
});

const TOP_BADGE: &str = "Firing";

static STAR_CUTS: Lazy<Vec<f64>> = Lazy::new(|| vec![4.0, 8.0, 14.0, 22.0]);

/// Badge label for an index, or None when the index is missing.
pub fn surf_badge(idx: Option<f64>) -> Option<&'static str> {
    let idx = idx.filter(|x| x.is_finite())?;
    for band in BADGE_BANDS.iter() {
        if idx < band.below {
            return Some(band.label);
        }
    }
    Some(TOP_BADGE)
}

/// 0 stars for a missing index, otherwise 1..=5.
pub fn surf_stars(idx: Option<f64>) -> u8 {
    let Some(idx) = idx.filter(|x| x.is_finite()) else {
        return 0;
    };
    let above = STAR_CUTS.iter().filter(|c| idx >= **c).count();
    (above + 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surf_index_formula() {
        assert_eq!(surf_index(Some(1.5), Some(10.0)), Some(22.5));
        let idx = surf_index(Some(1.8), Some(11.0)).unwrap();
        assert!((idx - 35.64).abs() < 1e-9);
    }

    #[test]
    fn test_surf_index_missing_inputs() {
        assert_eq!(surf_index(None, Some(10.0)), None);
        assert_eq!(surf_index(Some(1.5), None), None);
        assert_eq!(surf_index(Some(f64::NAN), Some(10.0)), None);
    }

    #[test]
    fn test_badge_bands() {
        assert_eq!(surf_badge(Some(2.0)), Some("Small"));
        assert_eq!(surf_badge(Some(4.0)), Some("Okay"));
        assert_eq!(surf_badge(Some(15.0)), Some("Good"));
        assert_eq!(surf_badge(Some(25.0)), Some("Firing"));
        assert_eq!(surf_badge(None), None);
    }

    #[test]
    fn test_star_cut_points() {
        assert_eq!(surf_stars(None), 0);
        assert_eq!(surf_stars(Some(3.9)), 1);
        assert_eq!(surf_stars(Some(4.0)), 2);
        assert_eq!(surf_stars(Some(13.9)), 3);
        assert_eq!(surf_stars(Some(14.0)), 4);
        assert_eq!(surf_stars(Some(22.0)), 5);
    }
}
