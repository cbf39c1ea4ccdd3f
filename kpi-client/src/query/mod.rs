pub mod daily_kpi_queries;

pub use daily_kpi_queries::{
    comparison, load_daily_kpis, range_summary, yearly_totals, ComparisonRow, QueryError,
    RangeSummary, YearlyTotal,
};
