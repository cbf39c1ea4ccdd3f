use anyhow::Context;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const CONFIG_ENV: &str = "KPI_ETL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "kpi-etl.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub plant_registry: PathBuf,
    pub generation_series: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            plant_registry: PathBuf::from("data/raw/renewable_power_plants_DK.csv"),
            generation_series: PathBuf::from(
                "data/raw/time_series_60min_singleindex_filtered.csv",
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/processed/kpis_by_category.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus text-format file rewritten at the end of every run.
    pub textfile_path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub inputs: InputConfig,
    pub output: OutputConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// `KPI_ETL_CONFIG` if set, else `kpi-etl.toml` if present, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_path(path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_path(DEFAULT_CONFIG_PATH)
            }
            Err(_) => {
                tracing::info!("no config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_default_paths() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(
            cfg.inputs.plant_registry,
            PathBuf::from("data/raw/renewable_power_plants_DK.csv")
        );
        assert_eq!(
            cfg.output.path,
            PathBuf::from("data/processed/kpis_by_category.csv")
        );
        assert!(cfg.metrics.is_none());
    }

    #[test]
    fn sections_override_individual_paths() {
        let cfg = AppConfig::from_toml(
            r#"
            [inputs]
            generation_series = "fixtures/ts.csv"

            [output]
            path = "out/kpis.csv"

            [metrics]
            textfile_path = "out/kpi_etl.prom"
            "#,
        )
        .unwrap();

        assert_eq!(
            cfg.inputs.plant_registry,
            PathBuf::from("data/raw/renewable_power_plants_DK.csv")
        );
        assert_eq!(cfg.inputs.generation_series, PathBuf::from("fixtures/ts.csv"));
        assert_eq!(cfg.output.path, PathBuf::from("out/kpis.csv"));
        assert_eq!(
            cfg.metrics.unwrap().textfile_path,
            PathBuf::from("out/kpi_etl.prom")
        );
    }

    #[test]
    fn explicitly_named_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::from_path(dir.path().join("nope.toml")).is_err());
    }
}
