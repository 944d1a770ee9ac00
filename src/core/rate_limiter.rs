use std::time::Duration;
use tokio::time::sleep;
use rand::Rng;

pub struct RateLimiter;

impl RateLimiter {
    /// Pause between consecutive requests to the same provider. Multi-spot
    /// passes (alert checks, favorites compare) hit the forecast API once per
    /// spot; a jittered delay keeps those bursts polite on the free tier.
    pub async fn wait(source: &str) {
        match source {
            "marine" | "weather" => {
                let delay = {
                    let mut rng = rand::thread_rng();
                    rng.gen_range(300..800)
                };
                sleep(Duration::from_millis(delay)).await;
            }
            "geocoding" => {
                sleep(Duration::from_millis(150)).await;
            }
            _ => {
                sleep(Duration::from_millis(100)).await;
            }
        }
    }
}
