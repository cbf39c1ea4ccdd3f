use std::{fs, path::Path};

use kpi_etl::{config::AppConfig, pipeline::CsvPipeline, PipelineError, Stage};

const REGISTRY: &str = "\
name,lat,lon,energy_source_level_2,technology,electrical_capacity
Nørhede-Hjortmose,56.0,8.2,Wind,Onshore,100
Solpark Vandel,55.7,9.2,Solar,Photovoltaic,50
";

const SERIES: &str = "\
utc_timestamp,cet_cest_timestamp,DK_wind_onshore_generation_actual
2024-03-01T00:00:00Z,2024-03-01T01:00:00+0100,10
2024-03-01T01:00:00Z,2024-03-01T02:00:00+0100,20
";

fn config(dir: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.inputs.plant_registry = dir.join("raw/renewable_power_plants_DK.csv");
    cfg.inputs.generation_series = dir.join("raw/time_series_60min_singleindex_filtered.csv");
    cfg.output.path = dir.join("processed/kpis_by_category.csv");
    cfg
}

fn write_inputs(cfg: &AppConfig) {
    fs::create_dir_all(cfg.inputs.plant_registry.parent().unwrap()).unwrap();
    fs::write(&cfg.inputs.plant_registry, REGISTRY).unwrap();
    fs::write(&cfg.inputs.generation_series, SERIES).unwrap();
}

#[test]
fn two_plant_example_produces_one_daily_row() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    write_inputs(&cfg);

    let summary = CsvPipeline::from_config(&cfg).run().unwrap();
    assert_eq!(summary.plants_loaded, 2);
    assert_eq!(summary.plants_excluded, 0);
    assert_eq!(summary.generation_rows, 2);
    assert_eq!(summary.output.rows, 1);

    let written = fs::read_to_string(&cfg.output.path).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some(
            "utc_timestamp,wind_onshore_generation,wind_onshore_installed_capacity,\
             wind_onshore_capacity_factor"
        )
    );

    let row: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(&row[..3], &["2024-03-01", "15.0", "100.0"]);
    let factor: f64 = row[3].parse().unwrap();
    assert!((factor - 0.15).abs() < 1e-12);
    assert_eq!(lines.next(), None);

    assert!(!written.contains("solar"));
}

#[test]
fn rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    write_inputs(&cfg);

    let first = CsvPipeline::from_config(&cfg).run().unwrap();
    let bytes = fs::read(&cfg.output.path).unwrap();
    let second = CsvPipeline::from_config(&cfg).run().unwrap();

    assert_eq!(fs::read(&cfg.output.path).unwrap(), bytes);
    assert_eq!(first.output.digest, second.output.digest);
    assert_eq!(first.output.digest, blake3::hash(&bytes).to_hex().to_string());
}

#[test]
fn missing_registry_reports_source_unavailable_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::create_dir_all(cfg.inputs.generation_series.parent().unwrap()).unwrap();
    fs::write(&cfg.inputs.generation_series, SERIES).unwrap();

    let err = CsvPipeline::from_config(&cfg).run().unwrap_err();

    assert_eq!(err.stage(), Stage::Loader);
    assert!(
        matches!(err, PipelineError::SourceUnavailable { ref path, .. } if *path == cfg.inputs.plant_registry)
    );
    assert!(!cfg.output.path.exists());
}

#[test]
fn config_file_paths_drive_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let expected = config(dir.path());
    write_inputs(&expected);

    let toml = format!(
        "[inputs]\nplant_registry = {:?}\ngeneration_series = {:?}\n\n[output]\npath = {:?}\n",
        expected.inputs.plant_registry.to_str().unwrap(),
        expected.inputs.generation_series.to_str().unwrap(),
        dir.path().join("elsewhere/out.csv").to_str().unwrap(),
    );
    let cfg_path = dir.path().join("kpi-etl.toml");
    fs::write(&cfg_path, toml).unwrap();

    let cfg = AppConfig::from_path(&cfg_path).unwrap();
    let summary = CsvPipeline::from_config(&cfg).run().unwrap();

    assert_eq!(summary.output.path, dir.path().join("elsewhere/out.csv"));
    assert!(summary.output.path.exists());
}
