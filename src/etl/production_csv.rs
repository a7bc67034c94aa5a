//! Production CSV reader.
//!
//! Expected columns (header case and surrounding spaces are ignored):
//! `idpozo, anio, mes, empresa, sigla, prod_pet, prod_gas, prod_agua,
//! gas_venteo, formacion, cuenca, provincia, tipo_de_recurso, fecha_data`.
//! Only `idpozo`, `empresa` and a date (`fecha_data`, or `anio` + `mes`)
//! are required.

use std::io::Read;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use log::warn;

use super::fields::{parse_id, parse_month, parse_volume, HeaderIndex};
use super::operators::canonical_operator;
use super::ParseOutcome;
use crate::db::models::ProductionRecord;

fn record_date(index: &HeaderIndex, row: &csv::StringRecord) -> anyhow::Result<NaiveDate> {
    if let Some(raw) = index.get(row, "fecha_data") {
        return parse_month(raw).ok_or_else(|| anyhow!("Invalid fecha_data: {:?}", raw));
    }

    let year: i32 = index
        .require(row, "anio")?
        .parse()
        .context("Invalid anio")?;
    let month: u32 = index.require(row, "mes")?.parse().context("Invalid mes")?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid anio/mes: {}/{}", year, month))
}

fn parse_row(index: &HeaderIndex, row: &csv::StringRecord) -> anyhow::Result<ProductionRecord> {
    let well_id = parse_id(index.require(row, "idpozo")?, "idpozo")?;
    let operator = canonical_operator(index.require(row, "empresa")?);
    let date = record_date(index, row)?;

    let text = |name: &str| index.get(row, name).map(str::to_string);

    let mut record = ProductionRecord::new(well_id, operator, date);
    record.acronym = text("sigla");
    record.formation = text("formacion");
    record.basin = text("cuenca");
    record.province = text("provincia");
    record.resource_type = text("tipo_de_recurso");
    record.oil_volume = parse_volume(index.get(row, "prod_pet"), "prod_pet")?;
    record.gas_volume = parse_volume(index.get(row, "prod_gas"), "prod_gas")?;
    record.water_volume = parse_volume(index.get(row, "prod_agua"), "prod_agua")?;
    record.gas_flared = parse_volume(index.get(row, "gas_venteo"), "gas_venteo")?;

    if !record.has_valid_volumes() {
        return Err(anyhow!("Negative or non-finite volume"));
    }

    Ok(record)
}

/// Read every production row, skipping (and logging) rows that cannot be
/// used. Fails only when the file itself is unreadable or lacks the
/// mandatory columns.
pub fn read_production<R: Read>(reader: R) -> anyhow::Result<ParseOutcome<ProductionRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let index = HeaderIndex::new(reader.headers().context("Failed to read CSV headers")?);

    for required in ["idpozo", "empresa"] {
        if !index.has(required) {
            return Err(anyhow!("Production CSV is missing column {}", required));
        }
    }
    if !index.has("fecha_data") && !(index.has("anio") && index.has("mes")) {
        return Err(anyhow!("Production CSV needs fecha_data or anio + mes"));
    }

    let mut outcome = ParseOutcome::default();
    for (idx, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Failed to read row {}", idx + 1))?;
        match parse_row(&index, &row) {
            Ok(record) => outcome.records.push(record),
            Err(e) => {
                warn!("Skipping production row {}: {}", idx + 1, e);
                outcome.skipped += 1;
            },
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_reads_rows_and_canonicalises_operator() {
        let csv = "\
IDPOZO, Anio ,mes,empresa,sigla,prod_pet,prod_gas,prod_agua,formacion,cuenca,provincia,tipo_de_recurso,fecha_data
101,2024,3,YPF S.A.,YPF.Nq.LACh-1,120.5,30.25,10,vaca muerta,NEUQUINA,Neuquén,NO CONVENCIONAL,2024-03-01
102,2024,3,Shell Argentina S.A.,SH.x-2,,,,vaca muerta,NEUQUINA,Neuquén,NO CONVENCIONAL,2024-03-15 00:00:00
";
        let outcome = read_production(csv.as_bytes()).unwrap();

        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.records.len(), 2);

        let first = &outcome.records[0];
        assert_eq!(first.well_id, 101);
        assert_eq!(first.operator, "YPF");
        assert_eq!(first.date, ymd(2024, 3));
        assert_eq!((first.year, first.month), (2024, 3));
        assert_eq!(first.oil_volume, 120.5);
        assert_eq!(first.gas_flared, 0.0);
        assert_eq!(first.formation.as_deref(), Some("vaca muerta"));

        let second = &outcome.records[1];
        assert_eq!(second.operator, "SHELL");
        assert_eq!(second.date, ymd(2024, 3));
        assert_eq!(second.oil_volume, 0.0);
    }

    #[test]
    fn test_falls_back_to_year_and_month() {
        let csv = "idpozo,anio,mes,empresa,prod_pet,gas_venteo\n7,2023,11,Tecpetrol,5,1.5\n";
        let outcome = read_production(csv.as_bytes()).unwrap();

        assert_eq!(outcome.records[0].date, ymd(2023, 11));
        assert_eq!(outcome.records[0].gas_flared, 1.5);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let csv = "\
idpozo,empresa,prod_pet,fecha_data
1,YPF,-5,2024-01-01
,YPF,5,2024-01-01
3,YPF,abc,2024-01-01
4,YPF,5,not-a-date
5,YPF,5,2024-01-01
";
        let outcome = read_production(csv.as_bytes()).unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].well_id, 5);
        assert_eq!(outcome.skipped, 4);
    }

    #[test]
    fn test_missing_mandatory_columns_fail() {
        assert!(read_production("empresa,fecha_data\nYPF,2024-01-01\n".as_bytes()).is_err());
        assert!(read_production("idpozo,empresa,anio\n1,YPF,2024\n".as_bytes()).is_err());
    }
}
