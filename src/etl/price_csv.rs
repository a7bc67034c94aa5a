//! Monthly price CSV reader: `anio, mes, precio_usd`.

use std::io::Read;

use anyhow::{anyhow, Context};
use log::warn;

use super::fields::HeaderIndex;
use super::ParseOutcome;
use crate::db::models::PriceObservation;

fn parse_row(index: &HeaderIndex, row: &csv::StringRecord) -> anyhow::Result<PriceObservation> {
    let year: i32 = index.require(row, "anio")?.parse().context("Invalid anio")?;
    let month: i32 = index.require(row, "mes")?.parse().context("Invalid mes")?;
    let price: f64 = index
        .require(row, "precio_usd")?
        .parse()
        .context("Invalid precio_usd")?;

    if !(1..=12).contains(&month) {
        return Err(anyhow!("Month out of range: {}", month));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(anyhow!("Invalid price: {}", price));
    }

    Ok(PriceObservation::new(year, month, price))
}

pub fn read_prices<R: Read>(reader: R) -> anyhow::Result<ParseOutcome<PriceObservation>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let index = HeaderIndex::new(reader.headers().context("Failed to read CSV headers")?);

    for required in ["anio", "mes", "precio_usd"] {
        if !index.has(required) {
            return Err(anyhow!("Price CSV is missing column {}", required));
        }
    }

    let mut outcome = ParseOutcome::default();
    for (idx, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read row {}", idx + 1))?;
        match parse_row(&index, &row) {
            Ok(price) => outcome.records.push(price),
            Err(e) => {
                warn!("Skipping price row {}: {}", idx + 1, e);
                outcome.skipped += 1;
            },
        }
    }

    Ok(outcome)
}
