//! Per-month efficiency ratios and the flat-price revenue scenario.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::models::MonthlyProduction;

/// Gas is reported in thousands of m³.
pub const GAS_UNIT_M3: f64 = 1000.0;

/// Gas-oil ratio in m³ of gas per m³ of oil. 0 when no oil was produced.
#[inline]
pub fn gas_oil_ratio(gas_thousand_m3: f64, oil_m3: f64) -> f64 {
    if oil_m3 > 0.0 {
        gas_thousand_m3 * GAS_UNIT_M3 / oil_m3
    } else {
        0.0
    }
}

/// Flared share of produced gas, in percent. 0 when no gas was produced.
#[inline]
pub fn flare_ratio_pct(flared: f64, gas: f64) -> f64 {
    if gas > 0.0 {
        flared / gas * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMonth {
    pub date: NaiveDate,
    pub oil: f64,
    pub actual_revenue_usd: Option<f64>,
    pub scenario_revenue_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueScenario {
    pub price_usd: f64,
    pub months: Vec<ScenarioMonth>,
    pub total_actual_revenue_usd: f64,
    pub total_scenario_revenue_usd: f64,
}

/// Revenue each month would have earned at a flat `price_usd`, next to
/// the revenue at the historical reference price. Months without a
/// historical price add nothing to the actual total.
pub fn simulate_revenue(months: &[MonthlyProduction], price_usd: f64) -> RevenueScenario {
    let months: Vec<ScenarioMonth> = months
        .iter()
        .map(|m| ScenarioMonth {
            date: m.date,
            oil: m.oil,
            actual_revenue_usd: m.revenue_usd,
            scenario_revenue_usd: m.oil * price_usd,
        })
        .collect();

    let total_actual_revenue_usd = months.iter().filter_map(|m| m.actual_revenue_usd).sum();
    let total_scenario_revenue_usd = months.iter().map(|m| m.scenario_revenue_usd).sum();

    RevenueScenario {
        price_usd,
        months,
        total_actual_revenue_usd,
        total_scenario_revenue_usd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gor_zero_oil_is_zero() {
        assert_eq!(gas_oil_ratio(12.5, 0.0), 0.0);
        assert_eq!(gas_oil_ratio(0.0, 0.0), 0.0);
        assert!(gas_oil_ratio(12.5, 0.0).is_finite());
    }

    #[test]
    fn test_gor_scales_gas_units() {
        assert_eq!(gas_oil_ratio(2.0, 10.0), 200.0);
    }

    #[test]
    fn test_flare_ratio() {
        assert_eq!(flare_ratio_pct(5.0, 200.0), 2.5);
        assert_eq!(flare_ratio_pct(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_scenario_totals_skip_missing_prices() {
        let date = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let months = vec![
            MonthlyProduction { date: date(1), oil: 10.0, gas: 1.0, revenue_usd: Some(800.0) },
            MonthlyProduction { date: date(2), oil: 20.0, gas: 2.0, revenue_usd: None },
        ];
        let scenario = simulate_revenue(&months, 50.0);

        assert_eq!(scenario.months.len(), 2);
        assert_eq!(scenario.months[1].actual_revenue_usd, None);
        assert_eq!(scenario.months[1].scenario_revenue_usd, 1000.0);
        assert_eq!(scenario.total_actual_revenue_usd, 800.0);
        assert_eq!(scenario.total_scenario_revenue_usd, 1500.0);
    }
}
