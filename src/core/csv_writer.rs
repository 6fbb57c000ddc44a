use crate::domain::model::{CsvData, Record};
use crate::utils::error::{DcubeError, Result};

/// Renders records as comma-separated text. Pure: no file I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct CsvWriter {
    headers: bool,
    columns: Option<Vec<String>>,
}

impl CsvWriter {
    pub fn new(headers: bool) -> Self {
        Self {
            headers,
            columns: None,
        }
    }

    /// Fixes the column set and order for tabular output instead of taking it
    /// from the first record. Absent values become empty fields.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn write(&self, data: &CsvData) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        match data {
            CsvData::Table(rows) => {
                let Some(columns) = self.resolve_columns(rows.first()) else {
                    return Ok(String::new());
                };
                if self.headers {
                    writer.write_record(&columns)?;
                }
                for row in rows {
                    writer.write_record(Self::row_values(row, &columns))?;
                }
            }
            CsvData::Single(record) => {
                let columns = self
                    .resolve_columns(Some(record))
                    .unwrap_or_default();
                if self.headers {
                    writer.write_record(&columns)?;
                }
                writer.write_record(Self::row_values(record, &columns))?;
            }
            CsvData::IdList {
                value_column,
                values,
            } => {
                if self.headers {
                    writer.write_record(["id", value_column.as_str()])?;
                }
                for value in values {
                    writer.write_record(["id".to_string(), value.to_string()])?;
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DcubeError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| DcubeError::ProcessingError {
            message: format!("CSV output is not valid UTF-8: {}", e),
        })
    }

    fn resolve_columns(&self, first: Option<&Record>) -> Option<Vec<String>> {
        match &self.columns {
            Some(columns) => Some(columns.clone()),
            None => first.map(|record| record.columns().map(str::to_string).collect()),
        }
    }

    fn row_values(record: &Record, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|column| {
                record
                    .get(column)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            })
            .collect()
    }
}
