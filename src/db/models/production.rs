use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Monthly well-level production row (PostgreSQL `produccion`).
///
/// One row per well per month; `(well_id, date)` is unique and rows are
/// never updated once loaded. `date` is always the first day of the month.
///
/// Volumes follow the source dataset units: oil and water in m³,
/// gas and flared gas in thousands of m³.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub well_id: i64,
    pub year: i32,
    pub month: i32,
    pub operator: String,
    pub acronym: Option<String>,
    pub formation: Option<String>,
    pub basin: Option<String>,
    pub province: Option<String>,
    pub resource_type: Option<String>,
    pub date: NaiveDate,
    pub oil_volume: f64,
    pub gas_volume: f64,
    pub water_volume: f64,
    pub gas_flared: f64,
}

impl ProductionRecord {
    /// Year/month columns are kept in sync with `date` so the price join
    /// on (year, month) always agrees with the date ordering.
    pub fn new(well_id: i64, operator: String, date: NaiveDate) -> Self {
        Self {
            well_id,
            year: date.year(),
            month: date.month() as i32,
            operator,
            acronym: None,
            formation: None,
            basin: None,
            province: None,
            resource_type: None,
            date,
            oil_volume: 0.0,
            gas_volume: 0.0,
            water_volume: 0.0,
            gas_flared: 0.0,
        }
    }

    pub fn has_valid_volumes(&self) -> bool {
        [
            self.oil_volume,
            self.gas_volume,
            self.water_volume,
            self.gas_flared,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }
}
