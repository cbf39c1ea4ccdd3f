pub mod config;
pub mod metrics_textfile;
pub mod observability;
pub mod pipeline;
pub mod schema;
pub mod sinks;
pub mod sources;
pub mod transform;

pub use pipeline::{Pipeline, PipelineError, RunSummary, Stage};
