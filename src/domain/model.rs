use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value. Everything the API returns is reduced to one of these
/// before it reaches a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Empty)
    }

    /// Lenient numeric view: text is parsed, anything unparsable is 0.
    pub fn as_f64(&self) -> f64 {
        match self {
            Scalar::Empty => 0.0,
            Scalar::Bool(b) => f64::from(u8::from(*b)),
            Scalar::Int(i) => *i as f64,
            Scalar::Float(f) => *f,
            Scalar::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Empty | Scalar::Bool(false) => Ok(()),
            Scalar::Bool(true) => f.write_str("1"),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<serde_json::Value> for Scalar {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Scalar::Empty,
            serde_json::Value::Bool(b) => Scalar::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Scalar::Text(s),
            nested => Scalar::Text(nested.to_string()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

/// Ordered column name -> value mapping. Column order is first-insertion
/// order and drives CSV header generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: IndexMap<String, Scalar>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-inserting an existing column keeps its original position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Scalar>) {
        self.data.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.data.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Scalar> {
        self.data.shift_remove(column)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.data.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Builds a record from a JSON object, keeping the document's key order.
    /// Anything other than an object yields `None`.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(obj) => Some(
                obj.into_iter()
                    .map(|(key, value)| (key, Scalar::from(value)))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Input to the CSV writer.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvData {
    /// Rows sharing the first row's columns.
    Table(Vec<Record>),
    /// One flat record, one data row.
    Single(Record),
    /// Bare values listed as `id,<value>` pairs.
    IdList {
        value_column: String,
        values: Vec<Scalar>,
    },
}

impl CsvData {
    pub fn row_count(&self) -> usize {
        match self {
            CsvData::Table(rows) => rows.len(),
            CsvData::Single(_) => 1,
            CsvData::IdList { values, .. } => values.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Truncate,
    Append,
}

/// One rendered CSV document and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvOutput {
    pub filename: String,
    pub content: String,
    pub mode: WriteMode,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub processed_records: Vec<Record>,
    pub outputs: Vec<CsvOutput>,
}
