use std::path::PathBuf;

use surfcast_lib::models::Spot;
use surfcast_lib::{export, store, App};
use tracing_subscriber::EnvFilter;

/// One-shot forecast check from the command line:
/// `surf_check <lat> <lon> [name]`. Loads the spot, prints the current
/// summary and runs the alert pass once.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let lat: f64 = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: surf_check <lat> <lon> [name]"))?
        .parse()?;
    let lon: f64 = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: surf_check <lat> <lon> [name]"))?
        .parse()?;
    let name = args.next().unwrap_or_else(|| "Spot".to_string());

    let data_dir = std::env::var("SURFCAST_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"));
    std::fs::create_dir_all(&data_dir)?;

    let pool = store::init(&data_dir).await?;
    let app = App::with_open_meteo(pool);

    let spot = Spot::new(&name, lat, lon);
    println!("Loading forecast for {} ({})...", spot.place_label(), spot.id);

    match app.load_spot(&spot).await {
        Ok(data) => {
            let prov = &data.provenance;
            println!(
                "Loaded {} marine hours, {} weather hours (wave model: {})",
                data.marine.len(),
                data.weather.len(),
                prov.wave_model
            );
            if !prov.merged.is_empty() {
                println!("Merged from fallbacks: {}", prov.merged.join(", "));
            }

            if let Some(summary) = app.current_summary().await? {
                println!("\n{}", summary.place);
                println!("{}", summary.model_line);
                println!(
                    "Hs {:?} {} • swell period {:?}s • surf index {:?} ({})",
                    summary.wave_height.value,
                    summary.wave_height.unit,
                    summary.swell_period_s,
                    summary.surf_index,
                    summary.surf_badge.unwrap_or("—"),
                );
                println!(
                    "Wind {:?} {} from {:?}° {}",
                    summary.wind_speed.value,
                    summary.wind_speed.unit,
                    summary.wind_dir_deg,
                    summary.wind_dir_cardinal,
                );
                for e in &summary.tide_events {
                    println!(
                        "{}: {} ({:?} {})",
                        e.kind, e.time, e.height.value, e.height.unit
                    );
                }
                println!("{}", summary.tide_note);
            }

            // First few hours as CSV, the same rows the export hand-off emits.
            let rows = export::forecast_rows(&data, 6, surfcast_lib::core::timeseries::local_now());
            println!("\n{}", export::to_csv(&rows));
        }
        Err(e) => {
            eprintln!("Load failed: {}", e);
            std::process::exit(1);
        }
    }

    println!("\nRunning alert checks...");
    app.run_checks().await?;
    println!("Done.");
    Ok(())
}
