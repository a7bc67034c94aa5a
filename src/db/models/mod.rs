mod aggregates;
mod price;
mod production;
mod well;

pub use aggregates::{
    FlaringTotals, MonthlyFluids, MonthlyProduction, OperatorKpis, OperatorRevenue,
    UncompletedWells, WellMonth,
};
pub use price::PriceObservation;
pub use production::ProductionRecord;
pub use well::WellInventoryRecord;
