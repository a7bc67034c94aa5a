//! Job to refresh monthly reference prices from the price feed.

use anyhow::Result;
use log::info;

use crate::db::PostgresClient;
use crate::etl::PriceFeed;

/// Re-fetches the whole configured range and upserts it; the current
/// month's mean moves as new daily closes arrive.
pub async fn run(db: &PostgresClient, feed: &PriceFeed) -> Result<()> {
    info!("Starting refresh_prices job...");

    let start = std::time::Instant::now();

    let prices = feed.fetch_monthly().await?;
    let written = db.upsert_prices(&prices).await?;

    info!(
        "Completed refresh_prices job in {:?} ({} months written)",
        start.elapsed(),
        written
    );
    Ok(())
}
