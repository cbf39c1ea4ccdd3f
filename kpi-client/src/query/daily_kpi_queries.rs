use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use time::{macros::format_description, Date};

use crate::domain::{DailyKpiTable, KpiColumn, Metric};

#[cfg(feature = "serde")]
time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("KPI file {} not found; run the ETL pipeline first", .0.display())]
    NotRun(PathBuf),
    #[error("failed to read KPI file {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("column '{0}' is not present in the KPI file")]
    MissingColumn(String),
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: Date, end: Date },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RangeSummary {
    pub column: String,
    #[cfg_attr(feature = "serde", serde(with = "iso_date"))]
    pub start: Date,
    #[cfg_attr(feature = "serde", serde(with = "iso_date"))]
    pub end: Date,
    pub days: usize,
    /// Sum of the observed values; 0 when every day is missing.
    pub total: f64,
    /// `None` when every day is missing.
    pub daily_mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComparisonRow {
    #[cfg_attr(feature = "serde", serde(with = "iso_date"))]
    pub day: Date,
    pub primary: Option<f64>,
    pub secondary: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct YearlyTotal {
    pub year: i32,
    pub total: f64,
}

/// Read the daily KPI file written by the pipeline.
///
/// The first column is the day index; a missing file means the pipeline has
/// not run yet and is reported as `QueryError::NotRun`.
pub fn load_daily_kpis(path: impl AsRef<Path>) -> Result<DailyKpiTable, QueryError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(QueryError::NotRun(path.to_path_buf()));
    }

    let unreadable = |reason: String| QueryError::Unreadable {
        path: path.to_path_buf(),
        reason,
    };

    let mut rdr = csv::Reader::from_path(path).map_err(|e| unreadable(e.to_string()))?;
    let headers = rdr.headers().map_err(|e| unreadable(e.to_string()))?.clone();
    let index_name = headers
        .get(0)
        .ok_or_else(|| unreadable("file has no header row".to_string()))?
        .to_string();

    let mut days = Vec::new();
    let mut columns: Vec<KpiColumn> = headers
        .iter()
        .skip(1)
        .map(|name| KpiColumn::new(name, Vec::new()))
        .collect();

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| unreadable(e.to_string()))?;
        let raw_day = record.get(0).unwrap_or("");
        let day = parse_day(raw_day)
            .ok_or_else(|| unreadable(format!("row {}: invalid day '{raw_day}'", row + 1)))?;
        days.push(day);

        for (col, column) in columns.iter_mut().enumerate() {
            let raw = record.get(col + 1).unwrap_or("").trim();
            let value = if raw.is_empty() {
                None
            } else {
                Some(raw.parse::<f64>().map_err(|e| {
                    unreadable(format!("row {}: invalid {} '{raw}': {e}", row + 1, column.name))
                })?)
            };
            column.values.push(value);
        }
    }

    Ok(DailyKpiTable {
        index_name,
        days,
        columns,
    })
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_day(s: &str) -> Option<Date> {
    let s = s.trim();
    let date_part = s.get(..10)?;
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()
}

impl DailyKpiTable {
    /// Values of `{category}_{metric}` paired with their day.
    pub fn series(
        &self,
        category: &str,
        metric: Metric,
    ) -> Result<Vec<(Date, Option<f64>)>, QueryError> {
        let name = metric.column_name(category);
        let column = self
            .column(&name)
            .ok_or(QueryError::MissingColumn(name))?;
        Ok(self.days.iter().copied().zip(column.values.iter().copied()).collect())
    }

    /// Rows with `start <= day <= end`.
    pub fn filter_range(&self, start: Date, end: Date) -> Result<DailyKpiTable, QueryError> {
        if start > end {
            return Err(QueryError::InvalidRange { start, end });
        }

        let keep: Vec<usize> = self
            .days
            .iter()
            .enumerate()
            .filter(|(_, day)| (start..=end).contains(*day))
            .map(|(i, _)| i)
            .collect();

        Ok(DailyKpiTable {
            index_name: self.index_name.clone(),
            days: keep.iter().map(|&i| self.days[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| KpiColumn::new(c.name.clone(), keep.iter().map(|&i| c.values[i]).collect()))
                .collect(),
        })
    }

    /// From the first day of the last month present to the last day present,
    /// clamped to the first day of the table.
    pub fn default_range(&self) -> Option<(Date, Date)> {
        let first = *self.days.iter().min()?;
        let last = *self.days.iter().max()?;
        let month_start = last.replace_day(1).ok()?;
        Some((month_start.max(first), last))
    }
}

pub fn range_summary(
    table: &DailyKpiTable,
    category: &str,
    metric: Metric,
    start: Date,
    end: Date,
) -> Result<RangeSummary, QueryError> {
    let filtered = table.filter_range(start, end)?;
    let series = filtered.series(category, metric)?;

    let observed: Vec<f64> = series.iter().filter_map(|(_, v)| *v).collect();
    let total: f64 = observed.iter().sum();
    let daily_mean = if observed.is_empty() {
        None
    } else {
        Some(total / observed.len() as f64)
    };

    Ok(RangeSummary {
        column: metric.column_name(category),
        start,
        end,
        days: series.len(),
        total,
        daily_mean,
    })
}

/// Two categories of the same metric aligned by day.
pub fn comparison(
    table: &DailyKpiTable,
    primary: &str,
    secondary: &str,
    metric: Metric,
    start: Date,
    end: Date,
) -> Result<Vec<ComparisonRow>, QueryError> {
    let filtered = table.filter_range(start, end)?;
    let a = filtered.series(primary, metric)?;
    let b = filtered.series(secondary, metric)?;

    Ok(a
        .into_iter()
        .zip(b)
        .map(|((day, primary), (_, secondary))| ComparisonRow {
            day,
            primary,
            secondary,
        })
        .collect())
}

/// Per calendar year sum of a column over the whole table.
pub fn yearly_totals(
    table: &DailyKpiTable,
    category: &str,
    metric: Metric,
) -> Result<Vec<YearlyTotal>, QueryError> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for (day, value) in table.series(category, metric)? {
        *totals.entry(day.year()).or_insert(0.0) += value.unwrap_or(0.0);
    }

    Ok(totals
        .into_iter()
        .map(|(year, total)| YearlyTotal { year, total })
        .collect())
}
