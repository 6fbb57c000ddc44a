use crate::core::combiner::Combined;
use crate::domain::model::{CsvData, Record, Scalar};

/// How a source value becomes an output value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Copy,
    /// Microseconds to milliseconds, 2 decimals.
    MicrosToMillis,
    /// 2 decimals.
    Round2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub source: &'static str,
    pub kind: ColumnKind,
}

const fn copy(name: &'static str) -> Column {
    Column {
        name,
        source: name,
        kind: ColumnKind::Copy,
    }
}

const fn renamed(name: &'static str, source: &'static str) -> Column {
    Column {
        name,
        source,
        kind: ColumnKind::Copy,
    }
}

/// Long scenario labels returned by the API, projected onto short CSV names.
pub const SCENARIO_COLUMNS: &[Column] = &[
    renamed("src", "Source node(s)"),
    renamed("dest", "Destination node(s)"),
    renamed("gpio", "GPIO pin"),
    renamed("reliability", "Reliability [%]"),
    renamed("sent", "Messages sent to source node"),
    renamed("received", "Messages received on sink node"),
    renamed("correct", "Correct messages"),
    renamed("missed", "Missed messages"),
    // sic, the API spells it this way
    renamed("superfluous", "Superflous messages"),
    renamed("causality", "Messages with causality error"),
    renamed("lat_combined", "Latency combined [us]"),
    renamed("lat_mean", "Latency mean [us]"),
    renamed("lat_median", "Latency median [us]"),
    renamed("lat_90", "Latency 90 Percentile [us]"),
    renamed("lat_95", "Latency 95 Percentile [us]"),
    renamed("lat_99", "Latency 99 Percentile [us]"),
    renamed("energy_total", "Total Energy [J]"),
    renamed("energy_setup", "Energy during setup time [J]"),
];

pub const READABLE_COLUMNS: &[Column] = &[
    copy("id"),
    copy("name"),
    copy("reliability"),
    Column {
        name: "latency",
        source: "lat_combined",
        kind: ColumnKind::MicrosToMillis,
    },
    Column {
        name: "energy",
        source: "energy_total",
        kind: ColumnKind::Round2,
    },
    copy("jamming"),
    copy("layout"),
    copy("len"),
    copy("description"),
];

pub const PLOTTING_COLUMNS: &[Column] = &[
    copy("id"),
    copy("name"),
    copy("layout"),
    copy("jamming"),
    copy("len"),
    copy("reliability"),
    copy("sent"),
    copy("received"),
    copy("correct"),
    copy("missed"),
    copy("superfluous"),
    copy("causality"),
    copy("lat_combined"),
    copy("lat_mean"),
    copy("lat_median"),
    copy("lat_90"),
    copy("lat_95"),
    copy("lat_99"),
    copy("energy_total"),
    copy("energy_setup"),
    copy("description"),
];

pub const JOBS_READABLE_COLUMNS: &[Column] = &[
    copy("id"),
    copy("name"),
    copy("description"),
    renamed("proto", "protocol"),
    renamed("jam", "jamming"),
    renamed("len", "message_length"),
    renamed("period", "periodicity"),
    renamed("eval", "evaluated"),
    renamed("fin", "finished"),
];

/// Target audience of a remapped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Full fidelity, consumed by the plotting scripts.
    Plotting,
    /// Short summary printed to a terminal.
    Readable,
    /// Short summary of a job list entry.
    JobsReadable,
}

impl View {
    pub fn columns(self) -> &'static [Column] {
        match self {
            View::Plotting => PLOTTING_COLUMNS,
            View::Readable => READABLE_COLUMNS,
            View::JobsReadable => JOBS_READABLE_COLUMNS,
        }
    }

    pub fn header(self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name).collect()
    }
}

/// Two decimals, half away from zero. The scaled value is first snapped to
/// 9 decimals so that inputs like 1.005, stored as 1.00499999..., still
/// round up.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let snapped = (scaled * 1e9).round() / 1e9;
    snapped.round() / 100.0
}

/// Whole microseconds to milliseconds, rounded in integer hundredths.
fn micros_to_millis(micros: i64) -> f64 {
    let hundredths = (micros.abs() + 5) / 10;
    (micros.signum() * hundredths) as f64 / 100.0
}

fn convert(kind: ColumnKind, value: &Scalar) -> Scalar {
    match kind {
        ColumnKind::Copy => value.clone(),
        ColumnKind::MicrosToMillis => match value {
            Scalar::Int(micros) => Scalar::Float(micros_to_millis(*micros)),
            other => Scalar::Float(round2(other.as_f64() / 1000.0)),
        },
        ColumnKind::Round2 => Scalar::Float(round2(value.as_f64())),
    }
}

/// Projects `record` onto `view`. Columns whose source is absent or empty are
/// left out rather than reported as an error.
pub fn remap(record: &Record, view: View) -> Record {
    view.columns()
        .iter()
        .filter_map(|column| {
            record
                .get(column.source)
                .filter(|value| !value.is_empty())
                .map(|value| (column.name, convert(column.kind, value)))
        })
        .collect()
}

/// Remaps whatever the combiner produced, keeping its single/set shape.
pub fn remap_combined(combined: &Combined, view: View) -> CsvData {
    match combined {
        Combined::Single(record) => CsvData::Single(remap(record, view)),
        Combined::Set(records) => {
            CsvData::Table(records.iter().map(|record| remap(record, view)).collect())
        }
    }
}

/// Renames the API's scenario labels. Unlike `remap`, the row shape is fixed:
/// a missing label still produces its column, holding an empty value.
pub fn simplify_scenario(raw: &Record) -> Record {
    SCENARIO_COLUMNS
        .iter()
        .map(|column| {
            let value = raw.get(column.source).cloned().unwrap_or_default();
            (column.name, value)
        })
        .collect()
}
