use std::path::PathBuf;

use kpi_client::domain::{ColumnValues, GenerationSeries, SeriesColumn};

use crate::pipeline::{PipelineError, Source};
use crate::sources::csv_fields::{is_missing, parse_optional_string};
use crate::sources::timestamp::parse_timestamp;

/// CSV source for the generation time series.
///
/// The first column is the timestamp index; every other column becomes a
/// series column, numeric when all of its present cells parse as numbers.
/// Offset-aware timestamps are normalized to UTC and a file mixing aware and
/// naive timestamps is rejected.
pub struct GenerationSeriesCsvFileSource {
    path: PathBuf,
}

impl GenerationSeriesCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

fn classify(cells: Vec<Option<String>>) -> ColumnValues {
    let numeric: Result<Vec<Option<f64>>, _> = cells
        .iter()
        .map(|c| match c {
            Some(s) => s.trim().parse::<f64>().map(Some),
            None => Ok(None),
        })
        .collect();

    match numeric {
        Ok(values) => ColumnValues::Numeric(values),
        Err(_) => ColumnValues::Text(cells),
    }
}

impl Source<GenerationSeries> for GenerationSeriesCsvFileSource {
    fn load(&self) -> Result<GenerationSeries, PipelineError> {
        let fail = |reason: String| PipelineError::source_unavailable(&self.path, reason);

        let mut rdr = csv::Reader::from_path(&self.path)
            .map_err(|e| fail(format!("failed to open generation series: {e}")))?;
        let headers = rdr
            .headers()
            .map_err(|e| fail(format!("failed to read generation series headers: {e}")))?
            .clone();
        let index_name = headers
            .get(0)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| fail("generation series has no index column".to_string()))?
            .to_string();

        let mut timestamps = Vec::new();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len() - 1];
        let mut aware: Option<bool> = None;

        for result in rdr.records() {
            let record = result
                .map_err(|e| fail(format!("failed to read generation series record: {e}")))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let raw_ts = record.get(0).unwrap_or("");
            if is_missing(raw_ts) {
                return Err(fail(format!("line {line}: missing timestamp")));
            }
            let ts = parse_timestamp(raw_ts).map_err(|e| fail(format!("line {line}: {e}")))?;
            match aware {
                None => aware = Some(ts.is_aware()),
                Some(a) if a != ts.is_aware() => {
                    return Err(fail(format!(
                        "line {line}: file mixes offset-aware and naive timestamps"
                    )));
                }
                Some(_) => {}
            }
            timestamps.push(ts.value());

            for (i, column) in cells.iter_mut().enumerate() {
                column.push(parse_optional_string(record.get(i + 1).unwrap_or("")));
            }
        }

        let columns: Vec<SeriesColumn> = headers
            .iter()
            .skip(1)
            .zip(cells)
            .map(|(name, values)| SeriesColumn {
                name: name.to_string(),
                values: classify(values),
            })
            .collect();

        let series = GenerationSeries::new(index_name, timestamps, columns)
            .map_err(|e| fail(e.to_string()))?;

        metrics::counter!("kpi_etl_generation_rows_total").increment(series.len() as u64);
        tracing::info!(
            path = %self.path.display(),
            rows = series.len(),
            columns = series.columns().len(),
            "generation series loaded"
        );

        Ok(series)
    }
}
