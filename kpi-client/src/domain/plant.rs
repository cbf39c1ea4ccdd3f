use std::{borrow::Borrow, fmt};

/// One row of the plant registry.
///
/// `name`, `lat` and `lon` only identify the plant; the KPI pipeline reads
/// the source, technology and capacity fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantRecord {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub energy_source_level_2: Option<String>,
    pub technology: Option<String>,
    /// Rated electrical capacity in MW.
    pub electrical_capacity: Option<f64>,
}

impl PlantRecord {
    /// Category of this plant, or `None` when either source field is missing.
    pub fn category_key(&self) -> Option<CategoryKey> {
        match (&self.energy_source_level_2, &self.technology) {
            (Some(source), Some(technology)) => Some(CategoryKey::derive(source, technology)),
            _ => None,
        }
    }
}

/// Grouping key combining energy source and technology, e.g. `wind_onshore`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryKey(String);

impl CategoryKey {
    /// Lowercases both fields independently, joins them with `_` and then
    /// replaces literal spaces (only `' '`, not other whitespace) with `_`.
    pub fn derive(energy_source_level_2: &str, technology: &str) -> Self {
        let joined = format!(
            "{}_{}",
            energy_source_level_2.to_lowercase(),
            technology.to_lowercase()
        );
        Self(joined.replace(' ', "_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CategoryKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant(source: Option<&str>, technology: Option<&str>) -> PlantRecord {
        PlantRecord {
            name: Some("p-1".to_string()),
            lat: None,
            lon: None,
            energy_source_level_2: source.map(str::to_string),
            technology: technology.map(str::to_string),
            electrical_capacity: Some(1.0),
        }
    }

    #[test]
    fn category_key_lowercases_and_joins() {
        assert_eq!(CategoryKey::derive("Wind", "Onshore").as_str(), "wind_onshore");
        assert_eq!(CategoryKey::derive("Solar", "Photovoltaic").as_str(), "solar_photovoltaic");
    }

    #[test]
    fn category_key_replaces_only_literal_spaces() {
        assert_eq!(
            CategoryKey::derive("Bioenergy", "Sewage and landfill gas").as_str(),
            "bioenergy_sewage_and_landfill_gas"
        );
        assert_eq!(CategoryKey::derive("Wind", "off\tshore").as_str(), "wind_off\tshore");
    }

    #[test]
    fn category_key_is_none_when_a_source_field_is_missing() {
        assert!(plant(None, Some("Onshore")).category_key().is_none());
        assert!(plant(Some("Wind"), None).category_key().is_none());
        assert_eq!(
            plant(Some("Wind"), Some("Offshore")).category_key(),
            Some(CategoryKey::from("wind_offshore"))
        );
    }
}
