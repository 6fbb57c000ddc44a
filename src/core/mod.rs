pub mod combiner;
pub mod csv_writer;
pub mod engine;
pub mod normalizer;
pub mod remapper;

pub use crate::domain::model::{CsvData, CsvOutput, Record, Scalar, TransformResult, WriteMode};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
