use std::{fmt, path::PathBuf, time::Instant};

use kpi_client::domain::{DailyKpiTable, GenerationSeries, Metric, PlantRecord};

use crate::config::AppConfig;
use crate::sinks::DailyKpiCsvFileSink;
use crate::sources::{GenerationSeriesCsvFileSource, PlantRegistryCsvFileSource};
use crate::transform::{Categorizer, DailyResampler, KpiBuilder, KpiInputs};

/// Ordered stages of a run; every error is attributed to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loader,
    Categorizer,
    KpiBuilder,
    Resampler,
    Writer,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loader => "loader",
            Self::Categorizer => "categorizer",
            Self::KpiBuilder => "kpi_builder",
            Self::Resampler => "resampler",
            Self::Writer => "writer",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source unavailable: {}: {reason}", .path.display())]
    SourceUnavailable { path: PathBuf, reason: String },
    #[error("transform failure in {stage}: {reason}")]
    TransformFailure { stage: Stage, reason: String },
    #[error("sink failure: {}: {reason}", .path.display())]
    SinkFailure { path: PathBuf, reason: String },
}

impl PipelineError {
    pub fn source_unavailable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn transform_failure(stage: Stage, reason: impl fmt::Display) -> Self {
        Self::TransformFailure {
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn sink_failure(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::SinkFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::SourceUnavailable { .. } => Stage::Loader,
            Self::TransformFailure { stage, .. } => *stage,
            Self::SinkFailure { .. } => Stage::Writer,
        }
    }
}

pub trait Source<T> {
    fn load(&self) -> Result<T, PipelineError>;
}

pub trait Transform<I, O> {
    fn apply(&self, input: I) -> Result<O, PipelineError>;
}

pub trait Sink<T> {
    fn write(&self, input: &T) -> Result<WriteReport, PipelineError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// BLAKE3 hex digest of the bytes written.
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub plants_loaded: usize,
    pub plants_excluded: usize,
    pub generation_rows: usize,
    pub categories_emitted: Vec<String>,
    pub categories_skipped: Vec<String>,
    pub output: WriteReport,
}

/// Loader -> Categorizer -> KPI Builder -> Resampler -> Writer.
///
/// Stages run one after another; the first error halts the run and nothing
/// downstream of the failing stage is touched.
pub struct Pipeline<P, G, K> {
    pub plants: P,
    pub generation: G,
    pub categorizer: Categorizer,
    pub kpi_builder: KpiBuilder,
    pub resampler: DailyResampler,
    pub sink: K,
}

pub type CsvPipeline =
    Pipeline<PlantRegistryCsvFileSource, GenerationSeriesCsvFileSource, DailyKpiCsvFileSink>;

impl CsvPipeline {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Pipeline {
            plants: PlantRegistryCsvFileSource::new(&cfg.inputs.plant_registry),
            generation: GenerationSeriesCsvFileSource::new(&cfg.inputs.generation_series),
            categorizer: Categorizer,
            kpi_builder: KpiBuilder::default(),
            resampler: DailyResampler,
            sink: DailyKpiCsvFileSink::new(&cfg.output.path),
        }
    }
}

impl<P, G, K> Pipeline<P, G, K>
where
    P: Source<Vec<PlantRecord>>,
    G: Source<GenerationSeries>,
    K: Sink<DailyKpiTable>,
{
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let plants = run_stage(Stage::Loader, || self.plants.load())?;
        let series = run_stage(Stage::Loader, || self.generation.load())?;

        let capacity = run_stage(Stage::Categorizer, || {
            self.categorizer.apply(plants.as_slice())
        })?;

        let kpis = run_stage(Stage::KpiBuilder, || {
            self.kpi_builder.apply(KpiInputs {
                series: &series,
                capacity: &capacity,
            })
        })?;

        let daily = run_stage(Stage::Resampler, || self.resampler.apply(&kpis))?;
        let output = run_stage(Stage::Writer, || self.sink.write(&daily))?;

        let (categories_emitted, categories_skipped): (Vec<String>, Vec<String>) = self
            .kpi_builder
            .map()
            .entries()
            .iter()
            .map(|m| m.category.clone())
            .partition(|c| kpis.column(&Metric::Generation.column_name(c)).is_some());

        Ok(RunSummary {
            plants_loaded: plants.len(),
            plants_excluded: capacity.excluded_rows,
            generation_rows: series.len(),
            categories_emitted,
            categories_skipped,
            output,
        })
    }
}

fn run_stage<T>(
    stage: Stage,
    f: impl FnOnce() -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    let span = tracing::info_span!("stage", stage = %stage);
    let _guard = span.enter();

    let started = Instant::now();
    let res = f();
    let elapsed = started.elapsed();
    metrics::histogram!("kpi_etl_stage_duration_seconds", "stage" => stage.as_str())
        .record(elapsed.as_secs_f64());

    match &res {
        Ok(_) => tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "stage complete"),
        Err(e) => {
            metrics::counter!("kpi_etl_stage_failures_total", "stage" => stage.as_str())
                .increment(1);
            tracing::error!(error = %e, "stage failed");
        }
    }

    res
}
