//! Pure analytical functions over query-layer rows.
//!
//! - [`forecast`] - quadratic volume forecast
//! - [`type_curve`] - well alignment by months since first production
//! - [`metrics`] - GOR, flaring ratio and the price scenario

pub mod forecast;
pub mod metrics;
pub mod type_curve;

pub use forecast::{forecast, trend_pct, ForecastPoint, Observation, DEFAULT_HORIZON, MIN_OBSERVATIONS};
pub use metrics::{flare_ratio_pct, gas_oil_ratio, simulate_revenue, RevenueScenario, ScenarioMonth};
pub use type_curve::{TypeCurvePoint, DEFAULT_MAX_MONTH};
