pub mod jobs_pipeline;
pub mod results_pipeline;

pub use jobs_pipeline::{JobsOptions, JobsPipeline};
pub use results_pipeline::{ResultsOptions, ResultsPipeline};
