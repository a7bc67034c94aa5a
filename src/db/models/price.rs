use serde::{Deserialize, Serialize};

/// Monthly reference oil price (PostgreSQL `precios_brent`).
///
/// Joined to production by (year, month). Prices are monthly means of
/// daily closes, rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub year: i32,
    pub month: i32,
    pub price_usd_per_bbl: f64,
}

impl PriceObservation {
    pub fn new(year: i32, month: i32, price_usd_per_bbl: f64) -> Self {
        Self {
            year,
            month,
            price_usd_per_bbl,
        }
    }
}
