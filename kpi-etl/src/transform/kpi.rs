use kpi_client::domain::{GenerationSeries, KpiColumn, KpiTable, Metric};

use crate::pipeline::{PipelineError, Stage, Transform};
use crate::schema::{category, generation};
use crate::transform::category::InstalledCapacity;

/// One row of the category map: which generation column feeds a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMapping {
    pub category: String,
    pub source_column: String,
}

impl CategoryMapping {
    pub fn new(category: impl Into<String>, source_column: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            source_column: source_column.into(),
        }
    }
}

/// Ordered category -> generation column table. Output columns follow this
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    entries: Vec<CategoryMapping>,
}

impl CategoryMap {
    pub fn new(entries: Vec<CategoryMapping>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CategoryMapping] {
        &self.entries
    }

    pub fn source_column(&self, category: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|m| m.category == category)
            .map(|m| m.source_column.as_str())
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::new(vec![
            CategoryMapping::new(category::WIND_ONSHORE, generation::WIND_ONSHORE_ACTUAL),
            CategoryMapping::new(category::WIND_OFFSHORE, generation::WIND_OFFSHORE_ACTUAL),
            CategoryMapping::new(category::SOLAR_PHOTOVOLTAIC, generation::SOLAR_ACTUAL),
        ])
    }
}

/// Generation divided by installed capacity; a capacity of exactly 0 is
/// replaced by 1.
pub fn capacity_factor(generation: Option<f64>, installed_capacity: f64) -> Option<f64> {
    let divisor = if installed_capacity == 0.0 {
        1.0
    } else {
        installed_capacity
    };
    generation.map(|g| g / divisor)
}

/// Builds generation, installed capacity and capacity factor columns for
/// every mapped category whose source column is present in `series`.
pub fn build_kpis(
    map: &CategoryMap,
    series: &GenerationSeries,
    capacity: &InstalledCapacity,
) -> Result<KpiTable, PipelineError> {
    let rows = series.len();
    let mut columns = Vec::with_capacity(map.entries().len() * Metric::ALL.len());

    for mapping in map.entries() {
        let Some(source) = series.column(&mapping.source_column) else {
            continue;
        };
        let values = source.values.as_numeric().ok_or_else(|| {
            PipelineError::transform_failure(
                Stage::KpiBuilder,
                format!(
                    "column '{}' mapped to {} is not numeric",
                    mapping.source_column, mapping.category
                ),
            )
        })?;

        let installed = capacity.get(&mapping.category).unwrap_or(0.0);
        let c = mapping.category.as_str();

        columns.push(KpiColumn::new(
            Metric::Generation.column_name(c),
            values.to_vec(),
        ));
        columns.push(KpiColumn::new(
            Metric::InstalledCapacity.column_name(c),
            vec![Some(installed); rows],
        ));
        columns.push(KpiColumn::new(
            Metric::CapacityFactor.column_name(c),
            values
                .iter()
                .map(|g| capacity_factor(*g, installed))
                .collect(),
        ));
    }

    Ok(KpiTable {
        index_name: series.index_name().to_string(),
        timestamps: series.timestamps().to_vec(),
        columns,
    })
}

pub struct KpiInputs<'a> {
    pub series: &'a GenerationSeries,
    pub capacity: &'a InstalledCapacity,
}

#[derive(Debug, Clone, Default)]
pub struct KpiBuilder {
    map: CategoryMap,
}

impl KpiBuilder {
    pub fn new(map: CategoryMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &CategoryMap {
        &self.map
    }
}

impl<'a> Transform<KpiInputs<'a>, KpiTable> for KpiBuilder {
    fn apply(&self, input: KpiInputs<'a>) -> Result<KpiTable, PipelineError> {
        let table = build_kpis(&self.map, input.series, input.capacity)?;

        for mapping in self.map.entries() {
            if input.series.column(&mapping.source_column).is_some() {
                metrics::counter!("kpi_etl_categories_emitted_total").increment(1);
            } else {
                metrics::counter!("kpi_etl_categories_skipped_total").increment(1);
                tracing::info!(
                    category = %mapping.category,
                    column = %mapping.source_column,
                    "generation column absent, category skipped"
                );
            }
        }
        tracing::info!(
            rows = table.len(),
            columns = table.columns.len(),
            "kpi table built"
        );

        Ok(table)
    }
}
