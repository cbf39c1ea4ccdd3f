use std::{fmt, str::FromStr};

use time::{Date, PrimitiveDateTime};

/// Per-category measure; output columns are named `{category}_{metric}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Metric {
    Generation,
    InstalledCapacity,
    CapacityFactor,
}

impl Metric {
    /// Column order used for every category.
    pub const ALL: [Metric; 3] = [
        Metric::Generation,
        Metric::InstalledCapacity,
        Metric::CapacityFactor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::InstalledCapacity => "installed_capacity",
            Self::CapacityFactor => "capacity_factor",
        }
    }

    pub fn column_name(self, category: &str) -> String {
        format!("{category}_{}", self.as_str())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("unknown metric '{0}' (expected generation, installed_capacity or capacity_factor)")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl KpiColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// KPI columns at the native granularity of the generation series.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiTable {
    pub index_name: String,
    pub timestamps: Vec<PrimitiveDateTime>,
    pub columns: Vec<KpiColumn>,
}

impl KpiTable {
    pub fn column(&self, name: &str) -> Option<&KpiColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// One row per calendar day; the table written by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyKpiTable {
    pub index_name: String,
    pub days: Vec<Date>,
    pub columns: Vec<KpiColumn>,
}

impl DailyKpiTable {
    pub fn column(&self, name: &str) -> Option<&KpiColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_column_names_follow_category_metric_convention() {
        assert_eq!(Metric::Generation.column_name("wind_onshore"), "wind_onshore_generation");
        assert_eq!(
            Metric::InstalledCapacity.column_name("solar_photovoltaic"),
            "solar_photovoltaic_installed_capacity"
        );
        assert_eq!(
            Metric::CapacityFactor.column_name("wind_offshore"),
            "wind_offshore_capacity_factor"
        );
    }

    #[test]
    fn metric_parses_from_its_column_suffix() {
        assert_eq!("capacity_factor".parse::<Metric>(), Ok(Metric::CapacityFactor));
        assert_eq!(
            "capacity".parse::<Metric>(),
            Err(UnknownMetric("capacity".to_string()))
        );
    }
}
