//! Reference oil price feed.
//!
//! Pulls daily closes from a chart-style JSON endpoint and reduces them to
//! month-start means, the granularity production is joined on.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Datelike, Utc};
use log::info;
use serde::Deserialize;
use url::Url;

use crate::config::PriceFeedSettings;
use crate::db::models::PriceObservation;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

/// One trading day's closing price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyClose {
    pub timestamp: i64,
    pub close: f64,
}

/// Extract daily closes from a chart response body. Days without a close
/// are dropped.
pub fn parse_chart(body: &str) -> anyhow::Result<Vec<DailyClose>> {
    let response: ChartResponse =
        serde_json::from_str(body).context("Failed to decode price feed response")?;

    if let Some(error) = response.chart.error.filter(|e| !e.is_null()) {
        return Err(anyhow!("Price feed returned an error: {}", error));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("Price feed returned no series"))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();

    Ok(timestamps
        .into_iter()
        .zip(closes)
        .filter_map(|(timestamp, close)| {
            close
                .filter(|c| c.is_finite())
                .map(|close| DailyClose { timestamp, close })
        })
        .collect())
}

/// Mean close per calendar month (UTC), rounded to cents, ascending.
pub fn monthly_means(closes: &[DailyClose]) -> Vec<PriceObservation> {
    let mut months: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for day in closes {
        let Some(dt) = DateTime::<Utc>::from_timestamp(day.timestamp, 0) else {
            continue;
        };
        let entry = months.entry((dt.year(), dt.month())).or_insert((0.0, 0));
        entry.0 += day.close;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|((year, month), (sum, count))| {
            let mean = sum / count as f64;
            PriceObservation::new(year, month as i32, (mean * 100.0).round() / 100.0)
        })
        .collect()
}

/// HTTP client for the configured price feed.
#[derive(Clone)]
pub struct PriceFeed {
    client: reqwest::Client,
    endpoint: Url,
}

impl PriceFeed {
    pub fn new(settings: &PriceFeedSettings) -> anyhow::Result<Self> {
        let endpoint = Self::endpoint(settings)?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("petrolens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build price feed HTTP client")?;

        Ok(Self { client, endpoint })
    }

    fn endpoint(settings: &PriceFeedSettings) -> anyhow::Result<Url> {
        let base = format!("{}/", settings.feed_url.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .with_context(|| format!("Invalid price feed url: {}", settings.feed_url))?
            .join(&settings.symbol)
            .with_context(|| format!("Invalid price symbol: {}", settings.symbol))?;
        url.query_pairs_mut()
            .append_pair("range", &settings.range)
            .append_pair("interval", "1d");
        Ok(url)
    }

    pub fn url(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the series and reduce it to monthly prices.
    pub async fn fetch_monthly(&self) -> anyhow::Result<Vec<PriceObservation>> {
        info!("Fetching reference prices from {}", self.endpoint);

        let body = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .context("Price feed request failed")?
            .error_for_status()
            .context("Price feed returned an error status")?
            .text()
            .await
            .context("Failed to read price feed body")?;

        let closes = parse_chart(&body)?;
        let prices = monthly_means(&closes);
        info!(
            "Price feed returned {} daily closes ({} months)",
            closes.len(),
            prices.len()
        );
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-02, 2024-01-03, 2024-02-01 (00:00 UTC), plus one empty day
    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704153600, 1704240000, 1706745600, 1706832000],
                "indicators": {"quote": [{"close": [75.8, 78.312, 81.5, null]}]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_drops_missing_closes() {
        let closes = parse_chart(BODY).unwrap();
        assert_eq!(closes.len(), 3);
        assert_eq!(closes[2], DailyClose { timestamp: 1706745600, close: 81.5 });
    }

    #[test]
    fn test_monthly_means_round_to_cents() {
        let prices = monthly_means(&parse_chart(BODY).unwrap());
        assert_eq!(
            prices,
            vec![
                PriceObservation::new(2024, 1, 77.06),
                PriceObservation::new(2024, 2, 81.5),
            ]
        );
    }

    #[test]
    fn test_feed_error_is_reported() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found"}}}"#;
        assert!(parse_chart(body).is_err());
    }

    #[test]
    fn test_endpoint_includes_symbol_and_range() {
        let feed = PriceFeed::new(&PriceFeedSettings::default()).unwrap();
        let url = feed.url().as_str();

        assert!(url.starts_with("https://query1.finance.yahoo.com/v8/finance/chart/BZ=F?"));
        assert!(url.contains("range=5y"));
        assert!(url.contains("interval=1d"));
    }
}
