use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use crate::core::alerts;
use crate::core::merge::MergeEngine;
use crate::provider::Notifier;

// Periodic alert checks run only while the application is alive; this is an
// in-process repeating job, not background push delivery.

const MIN_CHECK_MINUTES: i64 = 5;
const MAX_CHECK_MINUTES: i64 = 180;

/// Owns the repeating alert-check job. `restart` shuts the previous scheduler
/// down before starting the new one, so a settings change never leaves two
/// concurrent check loops running.
pub struct AlertScheduler {
    sched: Option<JobScheduler>,
}

impl AlertScheduler {
    pub fn new() -> Self {
        Self { sched: None }
    }

    pub fn is_running(&self) -> bool {
        self.sched.is_some()
    }

    pub async fn restart(
        &mut self,
        pool: SqlitePool,
        engine: Arc<MergeEngine>,
        notifier: Arc<dyn Notifier>,
        check_minutes: i64,
    ) -> anyhow::Result<()> {
        self.stop().await;

        let minutes = check_minutes.clamp(MIN_CHECK_MINUTES, MAX_CHECK_MINUTES) as u64;
        let sched = JobScheduler::new().await?;

        sched
            .add(Job::new_repeated_async(
                Duration::from_secs(minutes * 60),
                move |_uuid, _l| {
                    let pool = pool.clone();
                    let engine = engine.clone();
                    let notifier = notifier.clone();
                    Box::pin(async move {
                        info!("Running scheduled alert check...");
                        if let Err(e) =
                            alerts::run_all_checks(&pool, &engine, notifier.as_ref()).await
                        {
                            warn!("Scheduled alert check failed: {}", e);
                        }
                    })
                },
            )?)
            .await?;

        sched.start().await?;
        info!("Alert scheduler started (every {} min)", minutes);
        self.sched = Some(sched);
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(mut old) = self.sched.take() {
            if let Err(e) = old.shutdown().await {
                warn!("Failed to shut down previous scheduler: {}", e);
            }
        }
    }
}

impl Default for AlertScheduler {
    fn default() -> Self {
        Self::new()
    }
}
