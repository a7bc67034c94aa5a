//! Drilling inventory CSV reader.
//!
//! Columns: `idpozo, empresa, fecha_fin_perforacion, fecha_inicio_produccion`.
//! Either date may be blank.

use std::io::Read;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use log::warn;

use super::fields::{parse_date, parse_id, HeaderIndex};
use super::operators::canonical_operator;
use super::ParseOutcome;
use crate::db::models::WellInventoryRecord;

fn optional_date(
    index: &HeaderIndex,
    row: &csv::StringRecord,
    name: &str,
) -> anyhow::Result<Option<NaiveDate>> {
    index
        .get(row, name)
        .map(|raw| parse_date(raw).ok_or_else(|| anyhow!("Invalid {}: {:?}", name, raw)))
        .transpose()
}

fn parse_row(index: &HeaderIndex, row: &csv::StringRecord) -> anyhow::Result<WellInventoryRecord> {
    Ok(WellInventoryRecord {
        well_id: parse_id(index.require(row, "idpozo")?, "idpozo")?,
        operator: canonical_operator(index.require(row, "empresa")?),
        drilling_completed_on: optional_date(index, row, "fecha_fin_perforacion")?,
        production_started_on: optional_date(index, row, "fecha_inicio_produccion")?,
    })
}

pub fn read_wells<R: Read>(reader: R) -> anyhow::Result<ParseOutcome<WellInventoryRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let index = HeaderIndex::new(reader.headers().context("Failed to read CSV headers")?);

    for required in ["idpozo", "empresa", "fecha_fin_perforacion"] {
        if !index.has(required) {
            return Err(anyhow!("Well inventory CSV is missing column {}", required));
        }
    }

    let mut outcome = ParseOutcome::default();
    for (idx, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read row {}", idx + 1))?;
        match parse_row(&index, &row) {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                warn!("Skipping well row {}: {}", idx + 1, e);
                outcome.skipped += 1;
            },
        }
    }

    Ok(outcome)
}
