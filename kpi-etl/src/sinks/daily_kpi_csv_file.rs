use std::path::PathBuf;

use kpi_client::domain::DailyKpiTable;
use time::macros::format_description;

use crate::pipeline::{PipelineError, Sink, WriteReport};
use crate::sinks::write_atomically;

/// Writes the daily KPI table as CSV, replacing the file on every run.
pub struct DailyKpiCsvFileSink {
    path: PathBuf,
}

impl DailyKpiCsvFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

/// Integral values keep one decimal (`100.0`); everything else uses the
/// shortest representation that parses back to the same value.
pub fn format_value(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

pub fn encode_daily_kpis(table: &DailyKpiTable) -> Result<Vec<u8>, csv::Error> {
    let day_format = format_description!("[year]-[month]-[day]");
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let mut header = vec![table.index_name.as_str()];
    header.extend(table.column_names());
    wtr.write_record(&header)?;

    for (row, day) in table.days.iter().enumerate() {
        let mut record = Vec::with_capacity(table.columns.len() + 1);
        record.push(
            day.format(day_format)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
        );
        for column in &table.columns {
            record.push(
                column
                    .values
                    .get(row)
                    .copied()
                    .flatten()
                    .map(format_value)
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&record)?;
    }

    wtr.into_inner().map_err(|e| e.into_error().into())
}

impl Sink<DailyKpiTable> for DailyKpiCsvFileSink {
    fn write(&self, table: &DailyKpiTable) -> Result<WriteReport, PipelineError> {
        let bytes = encode_daily_kpis(table)
            .map_err(|e| PipelineError::sink_failure(&self.path, format!("encode failed: {e}")))?;
        write_atomically(&self.path, &bytes)
            .map_err(|e| PipelineError::sink_failure(&self.path, e))?;

        let digest = blake3::hash(&bytes).to_hex().to_string();
        metrics::counter!("kpi_etl_daily_rows_written_total").increment(table.len() as u64);
        tracing::info!(
            path = %self.path.display(),
            rows = table.len(),
            columns = table.columns.len(),
            digest = %digest,
            "daily kpi table written"
        );

        Ok(WriteReport {
            path: self.path.clone(),
            rows: table.len(),
            columns: table.columns.len(),
            digest,
        })
    }
}
