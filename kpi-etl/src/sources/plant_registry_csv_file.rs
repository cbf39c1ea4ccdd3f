use std::path::PathBuf;

use csv::StringRecord;
use kpi_client::domain::PlantRecord;

use crate::pipeline::{PipelineError, Source};
use crate::schema::registry;
use crate::sources::csv_fields::{column_index, parse_optional_f64, parse_optional_string};

/// CSV source for the plant registry.
///
/// Expected header columns (by name):
/// - energy_source_level_2
/// - technology
/// - electrical_capacity (MW)
/// - name, lat, lon (optional)
pub struct PlantRegistryCsvFileSource {
    path: PathBuf,
}

impl PlantRegistryCsvFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

struct RegistryColumns {
    name: Option<usize>,
    lat: Option<usize>,
    lon: Option<usize>,
    energy_source_level_2: usize,
    technology: usize,
    electrical_capacity: usize,
}

impl RegistryColumns {
    fn resolve(headers: &StringRecord) -> Result<Self, String> {
        let required = |name: &str| {
            column_index(headers, name).ok_or_else(|| format!("missing column '{name}'"))
        };

        Ok(Self {
            name: column_index(headers, registry::NAME),
            lat: column_index(headers, registry::LAT),
            lon: column_index(headers, registry::LON),
            energy_source_level_2: required(registry::ENERGY_SOURCE_LEVEL_2)?,
            technology: required(registry::TECHNOLOGY)?,
            electrical_capacity: required(registry::ELECTRICAL_CAPACITY)?,
        })
    }
}

fn record_to_plant(record: &StringRecord, cols: &RegistryColumns) -> Result<PlantRecord, String> {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let optional_f64 = |idx: Option<usize>, name: &str| match idx {
        Some(i) => parse_optional_f64(field(i)).map_err(|e| format!("invalid {name}: {e}")),
        None => Ok(None),
    };

    Ok(PlantRecord {
        name: cols.name.map(field).and_then(parse_optional_string),
        lat: optional_f64(cols.lat, registry::LAT)?,
        lon: optional_f64(cols.lon, registry::LON)?,
        energy_source_level_2: parse_optional_string(field(cols.energy_source_level_2)),
        technology: parse_optional_string(field(cols.technology)),
        electrical_capacity: optional_f64(
            Some(cols.electrical_capacity),
            registry::ELECTRICAL_CAPACITY,
        )?,
    })
}

impl Source<Vec<PlantRecord>> for PlantRegistryCsvFileSource {
    fn load(&self) -> Result<Vec<PlantRecord>, PipelineError> {
        let fail = |reason: String| PipelineError::source_unavailable(&self.path, reason);

        let mut rdr = csv::Reader::from_path(&self.path)
            .map_err(|e| fail(format!("failed to open plant registry: {e}")))?;
        let headers = rdr
            .headers()
            .map_err(|e| fail(format!("failed to read plant registry headers: {e}")))?
            .clone();
        let cols = RegistryColumns::resolve(&headers).map_err(fail)?;

        let mut plants = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| fail(format!("failed to read plant registry record: {e}")))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let plant = match record_to_plant(&record, &cols) {
                Ok(p) => p,
                Err(e) => {
                    metrics::counter!("kpi_etl_registry_parse_errors_total").increment(1);
                    return Err(fail(format!("line {line}: {e}")));
                }
            };
            plants.push(plant);
        }

        metrics::counter!("kpi_etl_plants_loaded_total").increment(plants.len() as u64);
        tracing::info!(
            path = %self.path.display(),
            plants = plants.len(),
            "plant registry loaded"
        );

        Ok(plants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn load(contents: &str) -> Result<Vec<PlantRecord>, PipelineError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plants.csv");
        fs::write(&path, contents).unwrap();
        PlantRegistryCsvFileSource::new(&path).load()
    }

    #[test]
    fn loads_plants_with_optional_fields() {
        let plants = load(
            "name,lat,lon,energy_source_level_2,technology,electrical_capacity\n\
             Horns Rev,55.5,7.9,Wind,Offshore,160\n\
             ,,,Solar,Photovoltaic,\n",
        )
        .unwrap();

        assert_eq!(plants.len(), 2);
        assert_eq!(plants[0].name.as_deref(), Some("Horns Rev"));
        assert_eq!(plants[0].lat, Some(55.5));
        assert_eq!(plants[0].electrical_capacity, Some(160.0));
        assert_eq!(plants[1].name, None);
        assert_eq!(plants[1].technology.as_deref(), Some("Photovoltaic"));
        assert_eq!(plants[1].electrical_capacity, None);
    }

    #[test]
    fn identifying_columns_are_optional() {
        let plants = load("energy_source_level_2,technology,electrical_capacity\nWind,Onshore,3.6\n")
            .unwrap();
        assert_eq!(plants[0].lat, None);
        assert_eq!(plants[0].energy_source_level_2.as_deref(), Some("Wind"));
    }

    #[test]
    fn missing_required_column_is_source_unavailable() {
        let err = load("energy_source_level_2,electrical_capacity\nWind,3.6\n").unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("technology"));
    }

    #[test]
    fn unparsable_capacity_is_source_unavailable() {
        let err = load("energy_source_level_2,technology,electrical_capacity\nWind,Onshore,big\n")
            .unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = PlantRegistryCsvFileSource::new(&path).load().unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { path: p, .. } if p == path));
    }
}
