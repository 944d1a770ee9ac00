use surfcast_lib::models::{Alert, LastSnapshot, MergedForecast, ModelProvenance, Settings, Spot};
use surfcast_lib::store;
use surfcast_lib::units::WaveUnit;

// Persistence layer against an in-memory database with the real migrations.

#[tokio::test]
async fn settings_default_then_roundtrip() {
    let pool = store::init_in_memory().await.unwrap();

    // Nothing saved yet: defaults.
    let s = store::load_settings(&pool).await.unwrap();
    assert_eq!(s, Settings::default());

    let custom = Settings {
        wave_unit: WaveUnit::Feet,
        wave_model: "ecmwf_wam025".to_string(),
        alert_check_minutes: 2,     // below the floor, must clamp to 5
        alert_cooldown_minutes: 99_999, // above the ceiling, must clamp to 1440
        ..Settings::default()
    };
    store::save_settings(&pool, &custom).await.unwrap();

    let loaded = store::load_settings(&pool).await.unwrap();
    assert_eq!(loaded.wave_unit, WaveUnit::Feet);
    assert_eq!(loaded.wave_model, "ecmwf_wam025");
    assert_eq!(loaded.alert_check_minutes, 5);
    assert_eq!(loaded.alert_cooldown_minutes, 1440);
}

#[tokio::test]
async fn favorites_front_insertion_and_face_deg() {
    let pool = store::init_in_memory().await.unwrap();

    let a = Spot::new("Alpha", 20.0, -105.0);
    let b = Spot::new("Bravo", 21.0, -106.0);
    store::add_favorite(&pool, &a).await.unwrap();
    store::add_favorite(&pool, &b).await.unwrap();

    // Most recently added first.
    let favs = store::list_favorites(&pool).await.unwrap();
    assert_eq!(favs.len(), 2);
    assert_eq!(favs[0].name, "Bravo");
    assert_eq!(favs[1].name, "Alpha");

    // Normalized into [0, 360).
    store::set_face_deg(&pool, &a.id, Some(-150.0)).await.unwrap();
    let a2 = store::get_favorite(&pool, &a.id).await.unwrap().unwrap();
    assert!((a2.face_deg.unwrap() - 210.0).abs() < 1e-9);

    store::set_face_deg(&pool, &a.id, None).await.unwrap();
    let a3 = store::get_favorite(&pool, &a.id).await.unwrap().unwrap();
    assert_eq!(a3.face_deg, None);

    store::remove_favorite(&pool, &b.id).await.unwrap();
    assert!(!store::is_favorite(&pool, &b.id).await.unwrap());
}

#[tokio::test]
async fn alerts_roundtrip_and_runtime() {
    let pool = store::init_in_memory().await.unwrap();

    let alert = Alert {
        id: Alert::generate_id(),
        name: "Big south swell".to_string(),
        spot_ids: vec!["20.0000,-105.0000".to_string()],
        enabled: true,
        min_hs_m: Some(2.0),
        min_swell_h_m: None,
        min_swell_p_s: Some(12.0),
        min_idx: None,
        max_wind_kmh: Some(20.0),
        wind_dir_center: Some(0.0),
        wind_dir_tol: Some(45.0),
        look_hours: 48,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    store::save_alert(&pool, &alert).await.unwrap();

    let alerts = store::list_alerts(&pool).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].spot_ids, alert.spot_ids);
    assert_eq!(alerts[0].min_hs_m, Some(2.0));
    assert_eq!(alerts[0].wind_dir_tol, Some(45.0));

    store::set_alert_enabled(&pool, &alert.id, false).await.unwrap();
    let alerts = store::list_alerts(&pool).await.unwrap();
    assert!(!alerts[0].enabled);

    // Runtime record: fires persist per alert id.
    assert_eq!(store::get_last_fired(&pool, &alert.id).await.unwrap(), None);
    store::mark_fired(&pool, &alert.id, 1_700_000_000_000).await.unwrap();
    assert_eq!(
        store::get_last_fired(&pool, &alert.id).await.unwrap(),
        Some(1_700_000_000_000)
    );

    store::set_last_check_at(&pool, 1_700_000_100_000).await.unwrap();
    let runtime = store::load_alert_runtime(&pool).await.unwrap();
    assert_eq!(runtime.last_fired.get(&alert.id), Some(&1_700_000_000_000));
    assert_eq!(runtime.last_check_at_ms, 1_700_000_100_000);

    store::delete_alert(&pool, &alert.id).await.unwrap();
    assert!(store::list_alerts(&pool).await.unwrap().is_empty());
    assert_eq!(store::get_last_fired(&pool, &alert.id).await.unwrap(), None);
}

#[tokio::test]
async fn last_snapshot_roundtrip() {
    let pool = store::init_in_memory().await.unwrap();
    assert!(store::get_last_snapshot(&pool).await.unwrap().is_none());

    let mut marine = surfcast_lib::models::HourlySeries {
        time: vec!["2026-08-06T00:00".to_string()],
        values: Default::default(),
    };
    marine.set_var("wave_height", vec![Some(1.5)]);

    let snapshot = LastSnapshot {
        spot: Spot::new("Testa", 20.0, -105.0),
        data: MergedForecast {
            marine,
            weather: Default::default(),
            provenance: ModelProvenance {
                wave_model: "auto".to_string(),
                requested_override: "auto".to_string(),
                merged: vec!["SST".to_string()],
            },
        },
        fetched_at: "2026-08-06T00:10:00Z".to_string(),
    };
    store::save_last_snapshot(&pool, &snapshot).await.unwrap();

    let loaded = store::get_last_snapshot(&pool).await.unwrap().unwrap();
    assert_eq!(loaded.spot.id, "20.0000,-105.0000");
    assert_eq!(loaded.data.marine.value_at("wave_height", 0), Some(1.5));
    assert_eq!(loaded.data.provenance.merged, vec!["SST"]);
}
