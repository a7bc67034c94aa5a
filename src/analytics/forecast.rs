//! Polynomial volume forecast.
//!
//! Fits `volume = c0 + c1·x + c2·x²` by least squares, where `x` is the
//! proleptic Gregorian day ordinal of each observation (0001-01-01 = 1),
//! then evaluates the curve at the next month starts.
//!
//! Ordinals are around 7.4e5, so `x²` is around 5e11. The fit runs on the
//! standardised abscissa `(x - mean) / std`, which spans the same
//! polynomial space and keeps the normal equations well conditioned.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fewer observations than this produce an empty forecast.
pub const MIN_OBSERVATIONS: usize = 7;

pub const DEFAULT_HORIZON: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub volume: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, volume: f64) -> Self {
        Self { date, volume }
    }
}

/// One extrapolated month.
///
/// Negative predictions are floored at zero; `clamped` records that the
/// raw curve went below zero at this point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub volume: f64,
    pub clamped: bool,
}

/// Day ordinal with 0001-01-01 as day 1.
pub fn ordinal(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Least-squares quadratic in the day ordinal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticFit {
    coefficients: [f64; 3],
    center: f64,
    scale: f64,
}

impl QuadraticFit {
    /// Returns `None` when the design matrix is singular (fewer than three
    /// distinct abscissae) or the inputs are not finite.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.len() != ys.len() || xs.len() < 3 {
            return None;
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return None;
        }

        let mut distinct: Vec<f64> = xs.to_vec();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        if distinct.len() < 3 {
            return None;
        }

        let n = xs.len() as f64;
        let center = xs.iter().sum::<f64>() / n;
        let scale = (xs.iter().map(|x| (x - center).powi(2)).sum::<f64>() / n).sqrt();
        if scale == 0.0 {
            return None;
        }

        // Normal equations: A·c = b with A[i][j] = Σ t^(i+j), b[i] = Σ y·t^i
        let mut power_sums = [0.0f64; 5];
        let mut b = [0.0f64; 3];
        for (x, y) in xs.iter().zip(ys) {
            let t = (x - center) / scale;
            let mut tp = 1.0;
            for (k, sum) in power_sums.iter_mut().enumerate() {
                *sum += tp;
                if k < 3 {
                    b[k] += y * tp;
                }
                tp *= t;
            }
        }

        let mut a = [[0.0f64; 3]; 3];
        for (i, row) in a.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = power_sums[i + j];
            }
        }

        let coefficients = solve_3x3(a, b)?;
        Some(Self {
            coefficients,
            center,
            scale,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        let [c0, c1, c2] = self.coefficients;
        c0 + t * (c1 + t * c2)
    }
}

/// Gaussian elimination with partial pivoting.
fn solve_3x3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    const EPS: f64 = 1e-12;

    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < EPS {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0f64; 3];
    for row in (0..3).rev() {
        let tail: f64 = (row + 1..3).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// The `horizon` month starts following the month of `last`.
pub fn next_month_starts(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    let Some(anchor) = last.with_day(1) else {
        return Vec::new();
    };
    (1..=horizon as u32)
        .map_while(|i| anchor.checked_add_months(Months::new(i)))
        .collect()
}

/// Extrapolate `horizon` monthly volumes from the observed history.
///
/// Returns an empty vector when there are fewer than [`MIN_OBSERVATIONS`]
/// points, when `horizon` is zero, or when the history cannot support a
/// quadratic fit. Callers treat an empty result as "not enough data".
pub fn forecast(history: &[Observation], horizon: usize) -> Vec<ForecastPoint> {
    if history.len() < MIN_OBSERVATIONS || horizon == 0 {
        return Vec::new();
    }

    let xs: Vec<f64> = history.iter().map(|o| ordinal(o.date)).collect();
    let ys: Vec<f64> = history.iter().map(|o| o.volume).collect();

    let Some(fit) = QuadraticFit::fit(&xs, &ys) else {
        return Vec::new();
    };

    let Some(last) = history.iter().map(|o| o.date).max() else {
        return Vec::new();
    };

    next_month_starts(last, horizon)
        .into_iter()
        .map(|date| {
            let raw = fit.predict(ordinal(date));
            ForecastPoint {
                date,
                volume: raw.max(0.0),
                clamped: raw < 0.0,
            }
        })
        .collect()
}

/// Percentage change from the last observed volume to the last forecast
/// volume. `None` when the last observation is not positive.
pub fn trend_pct(last_observed: f64, last_predicted: f64) -> Option<f64> {
    if last_observed > 0.0 {
        Some((last_predicted - last_observed) / last_observed * 100.0)
    } else {
        None
    }
}
