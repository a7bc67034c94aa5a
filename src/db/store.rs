use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::models::{
    FlaringTotals, MonthlyFluids, MonthlyProduction, OperatorKpis, OperatorRevenue,
    UncompletedWells, WellMonth,
};

/// Row filter shared by the production aggregates.
///
/// `since` is an inclusive floor on the production month. `formations` are
/// case-insensitive substrings of the formation name; a row matches when
/// any of them does. An empty list keeps every formation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionFilter {
    pub since: Option<NaiveDate>,
    pub formations: Vec<String>,
}

impl ProductionFilter {
    pub fn new(since: Option<NaiveDate>, formations: Vec<String>) -> Self {
        Self { since, formations }
    }

    /// `ILIKE` patterns for `formations`, with LIKE wildcards in the input
    /// escaped.
    pub fn formation_patterns(&self) -> Vec<String> {
        self.formations
            .iter()
            .map(|f| {
                let mut pattern = String::with_capacity(f.len() + 2);
                pattern.push('%');
                for c in f.chars() {
                    if matches!(c, '%' | '_' | '\\') {
                        pattern.push('\\');
                    }
                    pattern.push(c);
                }
                pattern.push('%');
                pattern
            })
            .collect()
    }
}

/// Read side of the production store.
///
/// Every operation runs one aggregate statement and returns its rows as
/// owned records. Unknown operators yield empty results, not errors.
#[async_trait]
pub trait ProductionStore: Send + Sync {
    /// Distinct operator names, ascending.
    async fn operators(&self) -> anyhow::Result<Vec<String>>;

    /// Monthly oil/gas totals and revenue for one operator, ascending by date.
    async fn monthly_production(
        &self,
        operator: &str,
        filter: &ProductionFilter,
    ) -> anyhow::Result<Vec<MonthlyProduction>>;

    async fn monthly_fluids(
        &self,
        operator: &str,
        filter: &ProductionFilter,
    ) -> anyhow::Result<Vec<MonthlyFluids>>;

    /// Oil per (well, month) for every well of the operator.
    async fn well_months(&self, operator: &str) -> anyhow::Result<Vec<WellMonth>>;

    async fn uncompleted_wells(&self) -> anyhow::Result<Vec<UncompletedWells>>;

    async fn flaring_totals(&self) -> anyhow::Result<Vec<FlaringTotals>>;

    /// Totals across the given operators, or across all of them when empty.
    async fn operator_kpis(
        &self,
        operators: &[String],
        filter: &ProductionFilter,
    ) -> anyhow::Result<OperatorKpis>;

    async fn revenue_ranking(
        &self,
        limit: i64,
        filter: &ProductionFilter,
    ) -> anyhow::Result<Vec<OperatorRevenue>>;

    async fn health_check(&self) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formation_patterns_wrap_and_escape() {
        let filter = ProductionFilter::new(None, vec!["VACA".to_string(), "50%_x".to_string()]);
        assert_eq!(
            filter.formation_patterns(),
            vec!["%VACA%".to_string(), "%50\\%\\_x%".to_string()]
        );
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let filter = ProductionFilter::default();
        assert!(filter.since.is_none());
        assert!(filter.formation_patterns().is_empty());
    }
}
