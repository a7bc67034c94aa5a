//! Read-side aggregate rows returned by the query layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Operator-level monthly totals with revenue.
///
/// `revenue_usd` is `None` for months without a reference price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProduction {
    pub date: NaiveDate,
    pub oil: f64,
    pub gas: f64,
    pub revenue_usd: Option<f64>,
}

/// Operator-level monthly fluid sums, the input for efficiency metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFluids {
    pub date: NaiveDate,
    pub water: f64,
    pub gas: f64,
    pub oil: f64,
}

/// Oil produced by one well in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellMonth {
    pub well_id: i64,
    pub date: NaiveDate,
    pub oil: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncompletedWells {
    pub operator: String,
    pub count: i64,
}

/// Produced and flared gas totals for one operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaringTotals {
    pub operator: String,
    pub gas: f64,
    pub flared: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorKpis {
    pub oil: f64,
    pub gas: f64,
    pub records: i64,
    pub revenue_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorRevenue {
    pub operator: String,
    pub revenue_usd: f64,
}
