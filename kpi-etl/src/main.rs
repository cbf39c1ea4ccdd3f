use anyhow::{Context, Result};
use kpi_etl::{config::AppConfig, metrics_textfile, observability, pipeline::CsvPipeline};

fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::load()?,
    };

    if cfg.metrics.is_some() {
        metrics_textfile::init()?;
    }

    tracing::info!(
        plant_registry = %cfg.inputs.plant_registry.display(),
        generation_series = %cfg.inputs.generation_series.display(),
        output = %cfg.output.path.display(),
        "starting kpi etl run"
    );
    let result = CsvPipeline::from_config(&cfg).run();

    // Written on failure too, so the failure counters are visible.
    if let Some(metrics_cfg) = &cfg.metrics {
        if let Err(e) = metrics_textfile::write_textfile(&metrics_cfg.textfile_path) {
            tracing::warn!(error = %e, "metrics textfile not written");
        }
    }

    match result {
        Ok(summary) => {
            tracing::info!(
                plants_loaded = summary.plants_loaded,
                plants_excluded = summary.plants_excluded,
                generation_rows = summary.generation_rows,
                categories = ?summary.categories_emitted,
                skipped = ?summary.categories_skipped,
                rows = summary.output.rows,
                digest = %summary.output.digest,
                "kpis saved to {}",
                summary.output.path.display()
            );
            Ok(())
        }
        Err(e) => {
            let stage = e.stage();
            tracing::error!(stage = %stage, error = %e, "kpi etl run failed");
            Err(e).with_context(|| format!("{stage} stage failed"))
        }
    }
}
