//! Request and response bodies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::{ForecastPoint, Observation, RevenueScenario};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct OperatorsResponse {
    pub total: usize,
    pub data: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductionRow {
    pub date: NaiveDate,
    pub oil: f64,
    pub gas: f64,
    pub revenue_usd: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct EfficiencyRow {
    pub date: NaiveDate,
    pub water_m3: f64,
    pub gas_m3: f64,
    pub oil_m3: f64,
    pub gor: f64,
}

#[derive(Debug, Serialize)]
pub struct UncompletedWellsRow {
    pub operator: String,
    pub uncompleted_well_count: i64,
}

#[derive(Debug, Serialize)]
pub struct FlaringRow {
    pub operator: String,
    pub flare_ratio_pct: f64,
    pub flared_volume: f64,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub operator: String,
    pub history: Vec<Observation>,
    /// Empty when the history is too short to fit.
    pub forecast: Vec<ForecastPoint>,
    pub trend_pct: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioResponse {
    pub operator: String,
    #[serde(flatten)]
    pub scenario: RevenueScenario,
}

// `formacion` takes comma-separated, case-insensitive substrings of the
// formation name, e.g. `?formacion=vaca,vm`.

/// `?desde=YYYY-MM-DD&formacion=A,B`
#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub desde: Option<NaiveDate>,
    pub formacion: Option<String>,
}

/// `?horizonte=N&formacion=A,B`
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub horizonte: Option<usize>,
    pub formacion: Option<String>,
}

/// `?precio=X&formacion=A,B`
#[derive(Debug, Default, Deserialize)]
pub struct ScenarioQuery {
    pub precio: Option<f64>,
    pub formacion: Option<String>,
}

/// `?empresas=A,B&desde=YYYY-MM-DD&formacion=A,B`
#[derive(Debug, Default, Deserialize)]
pub struct KpiQuery {
    pub empresas: Option<String>,
    pub desde: Option<NaiveDate>,
    pub formacion: Option<String>,
}

/// `?limite=N&desde=YYYY-MM-DD&formacion=A,B`
#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    pub limite: Option<i64>,
    pub desde: Option<NaiveDate>,
    pub formacion: Option<String>,
}
