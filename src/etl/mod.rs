//! Offline batch loads into the production store.
//!
//! Loads are run-to-completion: files are parsed up front, then written in
//! chunks of `etl.batch_size`. Inserts ignore rows that already exist and
//! price/well writes are upserts, so a failed load is recovered by running
//! it again.

pub mod download;
mod fields;
pub mod operators;
pub mod price_csv;
pub mod price_feed;
pub mod production_csv;
pub mod wells_csv;

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use log::info;

use crate::db::PostgresClient;

pub use download::{download_production, DownloadOutcome};
pub use operators::canonical_operator;
pub use price_feed::PriceFeed;

/// Parsed rows plus the number of rows skipped as unusable.
#[derive(Debug)]
pub struct ParseOutcome<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

impl<T> Default for ParseOutcome<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

/// Totals reported at the end of a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub read: usize,
    pub skipped: usize,
    pub written: u64,
}

fn open(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("Failed to open CSV file: {}", path.display()))
}

pub async fn load_production(
    db: &PostgresClient,
    path: &Path,
    batch_size: usize,
) -> anyhow::Result<LoadSummary> {
    info!("Reading production rows from {}", path.display());
    let outcome = production_csv::read_production(open(path)?)?;
    let total = outcome.records.len();

    let mut written = 0;
    for (i, chunk) in outcome.records.chunks(batch_size).enumerate() {
        written += db
            .insert_production(chunk)
            .await
            .with_context(|| format!("Failed to write production chunk {}", i + 1))?;
        info!(
            "Production load: {}/{} rows processed",
            (i * batch_size + chunk.len()).min(total),
            total
        );
    }

    let summary = LoadSummary {
        read: total,
        skipped: outcome.skipped,
        written,
    };
    info!(
        "Production load finished: {} read, {} skipped, {} new rows",
        summary.read, summary.skipped, summary.written
    );
    Ok(summary)
}

pub async fn load_wells(
    db: &PostgresClient,
    path: &Path,
    batch_size: usize,
) -> anyhow::Result<LoadSummary> {
    info!("Reading well inventory from {}", path.display());
    let outcome = wells_csv::read_wells(open(path)?)?;

    let mut written = 0;
    for chunk in outcome.records.chunks(batch_size) {
        written += db.upsert_wells(chunk).await?;
    }

    let summary = LoadSummary {
        read: outcome.records.len(),
        skipped: outcome.skipped,
        written,
    };
    info!(
        "Well inventory load finished: {} read, {} skipped, {} written",
        summary.read, summary.skipped, summary.written
    );
    Ok(summary)
}

/// Load monthly prices from a CSV file, or from the price feed when no
/// file is given.
pub async fn load_prices(
    db: &PostgresClient,
    source: Option<&Path>,
    feed: &PriceFeed,
    batch_size: usize,
) -> anyhow::Result<LoadSummary> {
    let outcome = match source {
        Some(path) => {
            info!("Reading prices from {}", path.display());
            price_csv::read_prices(open(path)?)?
        },
        None => ParseOutcome {
            records: feed.fetch_monthly().await?,
            skipped: 0,
        },
    };

    let mut written = 0;
    for chunk in outcome.records.chunks(batch_size) {
        written += db.upsert_prices(chunk).await?;
    }

    if let Some(last) = outcome.records.last() {
        info!(
            "Latest reference price: {}-{:02} US$ {:.2}",
            last.year, last.month, last.price_usd_per_bbl
        );
    }

    let summary = LoadSummary {
        read: outcome.records.len(),
        skipped: outcome.skipped,
        written,
    };
    info!(
        "Price load finished: {} months read, {} skipped, {} written",
        summary.read, summary.skipped, summary.written
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{sanitize_database_url, PostgresSettings, PriceFeedSettings};

    // Needs a PostgreSQL database it may write to (see db::postgres::queries tests).
    #[tokio::test]
    #[ignore]
    async fn test_price_load_is_written_in_batches() {
        let Ok(url) = std::env::var("DATABASE_URL") else { return };
        let db = PostgresClient::new(PostgresSettings {
            url: Some(sanitize_database_url(&url)),
            pool_size: 2,
            ..PostgresSettings::default()
        })
        .await
        .unwrap();
        db.migrate().await.unwrap();
        db.pool
            .get()
            .await
            .unwrap()
            .execute("DELETE FROM precios_brent WHERE anio = 1906", &[])
            .await
            .unwrap();

        let path = std::env::temp_dir().join(format!("petrolens-prices-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "anio,mes,precio_usd\n1906,1,10.5\n1906,2,11\n1906,3,12.25\n1906,1,10.75\n",
        )
        .unwrap();
        let feed = PriceFeed::new(&PriceFeedSettings::default()).unwrap();

        let summary = load_prices(&db, Some(path.as_path()), &feed, 1).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(summary.read, 4);
        assert_eq!(summary.written, 4);
        let row = db
            .pool
            .get()
            .await
            .unwrap()
            .query_one(
                "SELECT precio_usd FROM precios_brent WHERE anio = 1906 AND mes = 1",
                &[],
            )
            .await
            .unwrap();
        // Later rows win across batches
        assert_eq!(row.get::<_, f64>("precio_usd"), 10.75);
    }
}
