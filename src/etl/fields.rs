//! Header lookup and cell parsing shared by the CSV loaders.

use anyhow::{anyhow, Context};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rustc_hash::FxHashMap;

/// Column positions keyed by trimmed, lower-cased header name.
pub(crate) struct HeaderIndex {
    positions: FxHashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &csv::StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.trim().trim_start_matches('\u{feff}').to_lowercase(), idx))
            .collect();
        Self { positions }
    }

    pub(crate) fn has(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Trimmed cell value; empty cells read as missing.
    pub(crate) fn get<'r>(&self, row: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        self.positions
            .get(name)
            .and_then(|idx| row.get(*idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub(crate) fn require<'r>(
        &self,
        row: &'r csv::StringRecord,
        name: &str,
    ) -> anyhow::Result<&'r str> {
        self.get(row, name)
            .ok_or_else(|| anyhow!("Missing required field: {}", name))
    }
}

/// Volumes: missing cells count as zero.
pub(crate) fn parse_volume(value: Option<&str>, name: &str) -> anyhow::Result<f64> {
    match value {
        None => Ok(0.0),
        Some(v) => v
            .parse::<f64>()
            .with_context(|| format!("Invalid number in {}: {:?}", name, v)),
    }
}

/// Integer ids, tolerating a float rendering such as `"1234.0"`.
pub(crate) fn parse_id(value: &str, name: &str) -> anyhow::Result<i64> {
    if let Ok(id) = value.parse::<i64>() {
        return Ok(id);
    }
    let f = value
        .parse::<f64>()
        .with_context(|| format!("Invalid integer in {}: {:?}", name, value))?;
    if f.fract() != 0.0 || !f.is_finite() {
        return Err(anyhow!("Invalid integer in {}: {:?}", name, value));
    }
    Ok(f as i64)
}

/// Calendar date in any of the layouts the public datasets use.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok())
}

/// Date truncated to the first of its month.
pub(crate) fn parse_month(value: &str) -> Option<NaiveDate> {
    parse_date(value).and_then(|d| d.with_day(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month_layouts() {
        assert_eq!(parse_month("2024-03-01"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_month("2024-03-15 00:00:00"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_month("2024-03-15T10:20:30"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_month("2024-03"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_month("15/03/2024"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_month("March"), None);
    }

    #[test]
    fn test_parse_id_accepts_float_rendering() {
        assert_eq!(parse_id("1234", "idpozo").unwrap(), 1234);
        assert_eq!(parse_id("1234.0", "idpozo").unwrap(), 1234);
        assert!(parse_id("12.5", "idpozo").is_err());
        assert!(parse_id("abc", "idpozo").is_err());
    }

    #[test]
    fn test_parse_volume_defaults_to_zero() {
        assert_eq!(parse_volume(None, "prod_pet").unwrap(), 0.0);
        assert_eq!(parse_volume(Some("12.75"), "prod_pet").unwrap(), 12.75);
        assert!(parse_volume(Some("n/a"), "prod_pet").is_err());
    }

    #[test]
    fn test_header_index_normalises_names() {
        let headers = csv::StringRecord::from(vec![" IdPozo ", "EMPRESA"]);
        let row = csv::StringRecord::from(vec!["42", "  "]);
        let index = HeaderIndex::new(&headers);

        assert!(index.has("idpozo"));
        assert_eq!(index.get(&row, "idpozo"), Some("42"));
        assert_eq!(index.get(&row, "empresa"), None);
        assert!(index.require(&row, "empresa").is_err());
    }
}
