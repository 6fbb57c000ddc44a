use crate::domain::model::{Record, Scalar};

/// Separator the API uses when it folds several destination nodes into one
/// multi-point-to-point summary row.
pub const AGGREGATE_DEST_SEPARATOR: char = '*';

/// Queue fields copied onto each scenario row, as (output column, queue field).
pub const QUEUE_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("proto", "protocol"),
    ("description", "description"),
    ("jamming", "jamming"),
    ("layout", "layout"),
    ("len", "message_length"),
];

/// Result of joining scenario rows with their queue entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Combined {
    Single(Record),
    Set(Vec<Record>),
}

impl Combined {
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Combined::Single(record) => vec![record],
            Combined::Set(records) => records,
        }
    }
}

/// True when the last row is an MP2P aggregate, i.e. its `dest` lists several
/// nodes joined by `*`.
pub fn is_aggregate(records: &[Record]) -> bool {
    records.len() > 1
        && records
            .last()
            .and_then(|last| last.get("dest"))
            .map(|dest| dest.to_string().contains(AGGREGATE_DEST_SEPARATOR))
            .unwrap_or(false)
}

/// Appends the queue's shared fields to every scenario row. Missing queue
/// fields are carried as empty values.
pub fn join_queue(scenario: Vec<Record>, queue: &Record) -> Vec<Record> {
    scenario
        .into_iter()
        .map(|mut row| {
            for (column, field) in QUEUE_FIELDS {
                let value = queue.get(field).cloned().unwrap_or(Scalar::Empty);
                row.insert(*column, value);
            }
            row
        })
        .collect()
}

/// Joins and then unwraps:
/// - several rows with an aggregate last row collapse to that row,
/// - exactly one row unwraps to `Single`,
/// - anything else stays a `Set`.
pub fn combine(scenario: Vec<Record>, queue: &Record) -> Combined {
    let mut rows = join_queue(scenario, queue);

    if is_aggregate(&rows) {
        tracing::debug!(
            "Last of {} scenario rows is an MP2P aggregate, discarding the rest",
            rows.len()
        );
        if let Some(last) = rows.pop() {
            return Combined::Single(last);
        }
    }

    if rows.len() == 1 {
        return Combined::Single(rows.remove(0));
    }

    Combined::Set(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_row(dest: &str, reliability: f64) -> Record {
        let mut record = Record::new();
        record.insert("src", "1");
        record.insert("dest", dest);
        record.insert("reliability", reliability);
        record
    }

    fn queue() -> Record {
        let mut record = Record::new();
        record.insert("id", 31);
        record.insert("name", "osf");
        record.insert("protocol", 7);
        record.insert("description", "osf_jam1");
        record.insert("jamming", 1);
        record.insert("layout", 2);
        record.insert("message_length", 64);
        record.insert("priority", true);
        record
    }

    #[test]
    fn test_aggregate_row_collapses_set() {
        let scenario = vec![
            scenario_row("5", 90.0),
            scenario_row("6", 95.0),
            scenario_row("5*6*7", 92.5),
        ];

        let combined = combine(scenario, &queue());

        match combined {
            Combined::Single(record) => {
                assert_eq!(record.get("dest"), Some(&Scalar::Text("5*6*7".to_string())));
                assert_eq!(record.get("reliability"), Some(&Scalar::Float(92.5)));
                assert_eq!(record.get("id"), Some(&Scalar::Int(31)));
            }
            other => panic!("expected a single record, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_rows_are_all_kept() {
        let scenario = vec![
            scenario_row("5", 90.0),
            scenario_row("6", 95.0),
            scenario_row("5", 92.5),
        ];

        let combined = combine(scenario, &queue());

        match combined {
            Combined::Set(records) => {
                assert_eq!(records.len(), 3);
                assert_eq!(records[1].get("reliability"), Some(&Scalar::Float(95.0)));
            }
            other => panic!("expected a record set, got {:?}", other),
        }
    }

    #[test]
    fn test_single_row_unwraps() {
        let combined = combine(vec![scenario_row("5", 100.0)], &queue());
        assert!(matches!(combined, Combined::Single(_)));
        assert_eq!(combined.into_records().len(), 1);
    }

    #[test]
    fn test_single_aggregate_row_is_not_special() {
        let combined = combine(vec![scenario_row("5*6", 100.0)], &queue());
        assert!(matches!(combined, Combined::Single(_)));
    }

    #[test]
    fn test_empty_scenario_is_empty_set() {
        let combined = combine(Vec::new(), &queue());
        assert_eq!(combined, Combined::Set(Vec::new()));
    }

    #[test]
    fn test_queue_fields_are_appended_in_order() {
        let rows = join_queue(vec![scenario_row("5", 90.0)], &queue());
        let columns: Vec<&str> = rows[0].columns().collect();
        assert_eq!(
            columns,
            vec!["src", "dest", "reliability", "id", "name", "proto", "description", "jamming", "layout", "len"]
        );
        assert!(!rows[0].contains_key("priority"));
    }

    #[test]
    fn test_missing_queue_fields_are_empty() {
        let mut sparse = Record::new();
        sparse.insert("id", 3);

        let rows = join_queue(vec![scenario_row("5", 90.0)], &sparse);
        assert_eq!(rows[0].get("id"), Some(&Scalar::Int(3)));
        assert_eq!(rows[0].get("name"), Some(&Scalar::Empty));
        assert_eq!(rows[0].get("len"), Some(&Scalar::Empty));
    }

    #[test]
    fn test_numeric_dest_is_not_aggregate() {
        let mut last = Record::new();
        last.insert("dest", 6);
        let rows = vec![scenario_row("5", 1.0), last];
        assert!(!is_aggregate(&rows));
    }
}
