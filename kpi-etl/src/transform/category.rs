use std::collections::BTreeMap;

use kpi_client::domain::{CategoryKey, PlantRecord};

use crate::pipeline::{PipelineError, Transform};

/// Installed capacity (MW) summed per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstalledCapacity {
    by_category: BTreeMap<CategoryKey, f64>,
    /// Rows with a missing energy source or technology.
    pub excluded_rows: usize,
}

impl InstalledCapacity {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.by_category.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryKey, f64)> {
        self.by_category.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.by_category.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}

/// Groups plants by category and sums their capacity.
///
/// Missing capacities count as zero. Rows without a category are left out of
/// every group and counted in `excluded_rows`. Each group is summed in sorted
/// order so the result does not depend on the order of the registry rows.
pub fn aggregate_installed_capacity(plants: &[PlantRecord]) -> InstalledCapacity {
    let mut groups: BTreeMap<CategoryKey, Vec<f64>> = BTreeMap::new();
    let mut excluded_rows = 0;

    for plant in plants {
        match plant.category_key() {
            Some(key) => groups
                .entry(key)
                .or_default()
                .push(plant.electrical_capacity.unwrap_or(0.0)),
            None => excluded_rows += 1,
        }
    }

    let by_category = groups
        .into_iter()
        .map(|(key, mut values)| {
            values.sort_by(f64::total_cmp);
            (key, values.into_iter().sum())
        })
        .collect();

    InstalledCapacity {
        by_category,
        excluded_rows,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Categorizer;

impl<'a> Transform<&'a [PlantRecord], InstalledCapacity> for Categorizer {
    fn apply(&self, plants: &'a [PlantRecord]) -> Result<InstalledCapacity, PipelineError> {
        let capacity = aggregate_installed_capacity(plants);

        if capacity.excluded_rows > 0 {
            metrics::counter!("kpi_etl_plants_excluded_total")
                .increment(capacity.excluded_rows as u64);
            tracing::warn!(
                excluded = capacity.excluded_rows,
                "plants without energy source or technology left out of every category"
            );
        }
        for (category, mw) in capacity.iter() {
            metrics::gauge!("kpi_etl_installed_capacity_mw", "category" => category.to_string())
                .set(mw);
        }
        tracing::info!(categories = capacity.len(), "installed capacity aggregated");

        Ok(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant(source: Option<&str>, technology: Option<&str>, mw: Option<f64>) -> PlantRecord {
        PlantRecord {
            name: None,
            lat: None,
            lon: None,
            energy_source_level_2: source.map(str::to_string),
            technology: technology.map(str::to_string),
            electrical_capacity: mw,
        }
    }

    #[test]
    fn sums_capacity_per_category() {
        let capacity = aggregate_installed_capacity(&[
            plant(Some("Wind"), Some("Onshore"), Some(3.6)),
            plant(Some("Wind"), Some("Onshore"), Some(2.0)),
            plant(Some("Wind"), Some("Offshore"), Some(160.0)),
        ]);

        assert_eq!(capacity.len(), 2);
        assert_eq!(capacity.get("wind_onshore"), Some(5.6));
        assert_eq!(capacity.get("wind_offshore"), Some(160.0));
        assert_eq!(capacity.get("solar_photovoltaic"), None);
    }

    #[test]
    fn missing_capacity_counts_as_zero() {
        let capacity = aggregate_installed_capacity(&[
            plant(Some("Solar"), Some("Photovoltaic"), None),
            plant(Some("Solar"), Some("Photovoltaic"), Some(0.5)),
        ]);
        assert_eq!(capacity.get("solar_photovoltaic"), Some(0.5));

        let only_missing =
            aggregate_installed_capacity(&[plant(Some("Solar"), Some("Photovoltaic"), None)]);
        assert_eq!(only_missing.get("solar_photovoltaic"), Some(0.0));
    }

    #[test]
    fn rows_without_category_are_excluded_and_counted() {
        let capacity = aggregate_installed_capacity(&[
            plant(None, Some("Onshore"), Some(10.0)),
            plant(Some("Wind"), None, Some(10.0)),
            plant(Some("Wind"), Some("Onshore"), Some(1.0)),
        ]);

        assert_eq!(capacity.excluded_rows, 2);
        assert_eq!(capacity.len(), 1);
        assert_eq!(capacity.get("wind_onshore"), Some(1.0));
    }

    #[test]
    fn result_does_not_depend_on_row_order() {
        let mut plants = vec![
            plant(Some("Wind"), Some("Onshore"), Some(0.1)),
            plant(Some("Wind"), Some("Onshore"), Some(1e16)),
            plant(Some("Wind"), Some("Onshore"), Some(0.2)),
            plant(Some("Wind"), Some("Onshore"), Some(-1e16)),
            plant(Some("Wind"), Some("Onshore"), Some(0.3)),
        ];
        let expected = aggregate_installed_capacity(&plants);

        for _ in 0..plants.len() {
            plants.rotate_left(1);
            assert_eq!(aggregate_installed_capacity(&plants), expected);
            plants.reverse();
            assert_eq!(aggregate_installed_capacity(&plants), expected);
        }
    }

    #[test]
    fn empty_registry_yields_no_categories() {
        let plants: Vec<PlantRecord> = Vec::new();
        let capacity = Categorizer.apply(plants.as_slice()).unwrap();
        assert!(capacity.is_empty());
        assert_eq!(capacity.excluded_rows, 0);
    }
}
