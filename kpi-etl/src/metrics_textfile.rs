use std::path::Path;

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::sinks::write_atomically;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the Prometheus recorder. Safe to call more than once.
pub fn init() -> anyhow::Result<()> {
    PROM_HANDLE
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .context("failed to install Prometheus metrics recorder")?;
    Ok(())
}

/// Current metrics in Prometheus text format; `None` before `init`.
pub fn render() -> Option<String> {
    PROM_HANDLE.get().map(PrometheusHandle::render)
}

/// Snapshot for the node-exporter textfile collector. A batch run has no
/// long-lived listener to scrape.
pub fn write_textfile(path: &Path) -> anyhow::Result<()> {
    let Some(body) = render() else {
        anyhow::bail!("metrics recorder not initialized");
    };
    write_atomically(path, body.as_bytes())
        .with_context(|| format!("failed to write metrics textfile {}", path.display()))?;
    tracing::debug!(path = %path.display(), "metrics textfile written");
    Ok(())
}
