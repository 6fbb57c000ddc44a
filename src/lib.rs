pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::http::DcubeClient;
pub use adapters::storage::LocalStorage;
pub use app::pipelines::{JobsPipeline, ResultsPipeline};
pub use config::Settings;
pub use core::engine::ReportEngine;
pub use utils::error::{DcubeError, Result};
