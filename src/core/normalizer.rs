use crate::domain::model::{Record, Scalar};
use serde_json::Value;

/// Nested per-job result blob, never written to the job list.
const RESULT_FIELD: &str = "result";
const PERIODICITY_FIELD: &str = "periodicity";

/// Flattens a metric listing (`[{ "job": {...}, ... }, ...]`) into one record
/// per job. `result` is dropped, boolean `false` becomes `0` and a missing
/// `periodicity` is filled in with `0`, so every row has the same columns.
///
/// Only genuine booleans are rewritten. Entries without a `job` object are
/// skipped.
pub fn normalize_jobs(listing: &Value) -> Vec<Record> {
    entries(listing)
        .filter_map(|entry| entry.get("job"))
        .filter_map(|job| job.as_object())
        .map(|job| {
            let mut record: Record = job
                .iter()
                .filter(|(key, _)| key.as_str() != RESULT_FIELD)
                .map(|(key, value)| {
                    let scalar = match value {
                        Value::Bool(false) => Scalar::Int(0),
                        other => Scalar::from(other.clone()),
                    };
                    (key.clone(), scalar)
                })
                .collect();

            if !record.contains_key(PERIODICITY_FIELD) {
                record.insert(PERIODICITY_FIELD, Scalar::Int(0));
            }
            record
        })
        .collect()
}

/// Compact listing: just the job ids, one `{id}` record each.
pub fn job_ids(listing: &Value) -> Vec<Record> {
    entries(listing)
        .map(|entry| {
            let id = entry
                .get("job")
                .and_then(|job| job.get("id"))
                .cloned()
                .map(Scalar::from)
                .unwrap_or_default();
            let mut record = Record::new();
            record.insert("id", id);
            record
        })
        .collect()
}

fn entries(listing: &Value) -> impl Iterator<Item = &Value> {
    listing.as_array().into_iter().flatten()
}
