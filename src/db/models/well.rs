use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-well drilling inventory (PostgreSQL `inventario_pozos`).
///
/// A well with a drilling completion date and neither a recorded
/// production start nor any production rows is counted as drilled but
/// uncompleted (DUC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellInventoryRecord {
    pub well_id: i64,
    pub operator: String,
    pub drilling_completed_on: Option<NaiveDate>,
    pub production_started_on: Option<NaiveDate>,
}

impl WellInventoryRecord {
    pub fn is_uncompleted(&self) -> bool {
        self.drilling_completed_on.is_some() && self.production_started_on.is_none()
    }
}
