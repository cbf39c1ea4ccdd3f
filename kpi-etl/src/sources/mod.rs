pub mod csv_fields;
pub mod generation_series_csv_file;
pub mod plant_registry_csv_file;
pub mod timestamp;

pub use generation_series_csv_file::GenerationSeriesCsvFileSource;
pub use plant_registry_csv_file::PlantRegistryCsvFileSource;
