/// Column-name constants for the raw inputs and the known categories.

// ── Plant registry columns ──────────────────────────────────────────────────
pub mod registry {
    pub const NAME: &str = "name";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";
    pub const ENERGY_SOURCE_LEVEL_2: &str = "energy_source_level_2";
    pub const TECHNOLOGY: &str = "technology";
    pub const ELECTRICAL_CAPACITY: &str = "electrical_capacity";
}

// ── Generation series columns ───────────────────────────────────────────────
pub mod generation {
    pub const WIND_ONSHORE_ACTUAL: &str = "DK_wind_onshore_generation_actual";
    pub const WIND_OFFSHORE_ACTUAL: &str = "DK_wind_offshore_generation_actual";
    pub const SOLAR_ACTUAL: &str = "DK_solar_generation_actual";
}

// ── Known categories ────────────────────────────────────────────────────────
pub mod category {
    pub const WIND_ONSHORE: &str = "wind_onshore";
    pub const WIND_OFFSHORE: &str = "wind_offshore";
    pub const SOLAR_PHOTOVOLTAIC: &str = "solar_photovoltaic";
}
