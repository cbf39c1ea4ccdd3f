pub mod category;
pub mod kpi;
pub mod resample;

pub use category::{aggregate_installed_capacity, Categorizer, InstalledCapacity};
pub use kpi::{build_kpis, capacity_factor, CategoryMap, CategoryMapping, KpiBuilder, KpiInputs};
pub use resample::{resample_daily, DailyResampler};
