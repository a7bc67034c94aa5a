//! Cron scheduler for periodic background tasks while serving.
//!
//! Runs:
//! - Refreshing monthly reference prices from the price feed

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::config::PriceFeedSettings;
use crate::db::PostgresClient;
use crate::etl::PriceFeed;

use super::jobs;

/// Configuration for cron job intervals
#[derive(Debug, Clone)]
pub struct CronSettings {
    /// Interval for refreshing reference prices. 0 disables the job.
    pub refresh_prices_interval_secs: u64,
}

impl From<&PriceFeedSettings> for CronSettings {
    fn from(settings: &PriceFeedSettings) -> Self {
        Self {
            refresh_prices_interval_secs: settings.refresh_interval_secs,
        }
    }
}

impl CronSettings {
    pub fn has_jobs(&self) -> bool {
        self.refresh_prices_interval_secs > 0
    }
}

/// Cron scheduler that manages periodic background jobs.
pub struct CronScheduler {
    db: Arc<PostgresClient>,
    feed: Arc<PriceFeed>,
    settings: Arc<CronSettings>,
}

impl CronScheduler {
    pub fn new(db: Arc<PostgresClient>, feed: Arc<PriceFeed>, settings: CronSettings) -> Self {
        Self {
            db,
            feed,
            settings: Arc::new(settings),
        }
    }

    /// Starts the cron scheduler and runs until cancellation.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        let mut scheduler = JobScheduler::new().await?;

        let mut registered = 0;
        if self.settings.refresh_prices_interval_secs > 0 {
            self.register_refresh_prices_job(&scheduler).await?;
            registered += 1;
        }

        scheduler.start().await?;
        info!("Cron scheduler started with {} jobs", registered);

        cancellation_token.cancelled().await;
        info!("Cron scheduler shutting down...");

        scheduler.shutdown().await?;
        Ok(())
    }

    async fn register_refresh_prices_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let db = self.db.clone();
        let feed = self.feed.clone();
        let interval = self.settings.refresh_prices_interval_secs;

        let job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _lock| {
            let db = db.clone();
            let feed = feed.clone();
            Box::pin(async move {
                if let Err(e) = jobs::refresh_prices::run(&db, &feed).await {
                    error!("Failed to refresh prices: {:#}", e);
                }
            })
        })?;

        scheduler.add(job).await?;
        info!("Registered refresh_prices job (every {}s)", interval);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_disables_jobs() {
        let settings = CronSettings::from(&PriceFeedSettings::default());
        assert!(!settings.has_jobs());

        let settings = CronSettings::from(&PriceFeedSettings {
            refresh_interval_secs: 3600,
            ..PriceFeedSettings::default()
        });
        assert!(settings.has_jobs());
    }
}
