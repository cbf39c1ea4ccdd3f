use std::iter;

use kpi_client::domain::{DailyKpiTable, KpiColumn, KpiTable};
use time::Date;

use crate::pipeline::{PipelineError, Transform};

/// Calendar-day mean of every KPI column.
///
/// One row per day from the first to the last observed day, inclusive. Days
/// with no non-missing value (including days with no rows at all) come out
/// missing.
pub fn resample_daily(table: &KpiTable) -> DailyKpiTable {
    let first = table.timestamps.iter().min().map(|ts| ts.date());
    let last = table.timestamps.iter().max().map(|ts| ts.date());
    let days: Vec<Date> = match (first, last) {
        (Some(first), Some(last)) => iter::successors(Some(first), |d| d.next_day())
            .take_while(|d| *d <= last)
            .collect(),
        _ => Vec::new(),
    };

    let columns = table
        .columns
        .iter()
        .map(|column| KpiColumn::new(column.name.clone(), daily_means(table, column, &days)))
        .collect();

    DailyKpiTable {
        index_name: table.index_name.clone(),
        days,
        columns,
    }
}

fn daily_means(table: &KpiTable, column: &KpiColumn, days: &[Date]) -> Vec<Option<f64>> {
    let Some(first) = days.first() else {
        return Vec::new();
    };
    let mut means: Vec<Option<f64>> = vec![None; days.len()];
    let mut counts = vec![0u32; days.len()];

    for (ts, value) in table.timestamps.iter().zip(&column.values) {
        let Some(v) = value else { continue };
        let slot = (ts.date() - *first).whole_days() as usize;
        counts[slot] += 1;
        let mean = means[slot].unwrap_or(0.0);
        means[slot] = Some(mean + (v - mean) / f64::from(counts[slot]));
    }

    means
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DailyResampler;

impl<'a> Transform<&'a KpiTable, DailyKpiTable> for DailyResampler {
    fn apply(&self, table: &'a KpiTable) -> Result<DailyKpiTable, PipelineError> {
        let daily = resample_daily(table);
        tracing::info!(
            rows_in = table.len(),
            days = daily.len(),
            "kpis resampled to daily means"
        );
        Ok(daily)
    }
}
