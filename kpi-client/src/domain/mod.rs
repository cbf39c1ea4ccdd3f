mod generation;
mod kpi;
mod plant;

pub use generation::{ColumnValues, GenerationSeries, SeriesColumn, SeriesError};
pub use kpi::{DailyKpiTable, KpiColumn, KpiTable, Metric, UnknownMetric};
pub use plant::{CategoryKey, PlantRecord};
