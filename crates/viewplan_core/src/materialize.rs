//! Flattening of plan rows into fixed-arity integer records.
//!
//! # Responsibility
//! - Map each row type to its persistence table and column list.
//! - Coerce every field to `i64`.
//!
//! # Invariants
//! - Every record has exactly as many values as the declared columns.
//! - Row order is preserved.

use crate::model::assignment::{BatchViewAssignment, ViewAssignment};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Table receiving per-participant view rows.
pub const VIEWS_TABLE: &str = "participant_views";

/// Declared vs actual record width mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyError {
    /// Index of the first offending record.
    pub record_index: usize,
    pub expected: usize,
    pub actual: usize,
}

impl Display for ConsistencyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record {} has {} values but {} columns were declared",
            self.record_index, self.actual, self.expected
        )
    }
}

impl Error for ConsistencyError {}

/// Plan row with a fixed persistence schema.
pub trait ViewRecord {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Field values in `COLUMNS` order.
    fn values(&self) -> Vec<i64>;
}

impl ViewRecord for ViewAssignment {
    const TABLE: &'static str = VIEWS_TABLE;
    const COLUMNS: &'static [&'static str] = &["participant_id", "item_id", "view_order"];

    fn values(&self) -> Vec<i64> {
        vec![
            self.participant_id,
            self.item_id,
            i64::from(self.view_order),
        ]
    }
}

impl ViewRecord for BatchViewAssignment {
    const TABLE: &'static str = VIEWS_TABLE;
    const COLUMNS: &'static [&'static str] =
        &["participant_id", "item_id", "batch_id", "view_order"];

    fn values(&self) -> Vec<i64> {
        vec![
            self.participant_id,
            self.item_id,
            self.batch_id,
            i64::from(self.view_order),
        ]
    }
}

/// Records ready for a bulk insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub records: Vec<Vec<i64>>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Flattens `rows` into records matching `T::COLUMNS`.
pub fn to_records<T: ViewRecord>(rows: &[T]) -> Result<RecordSet, ConsistencyError> {
    let records: Vec<Vec<i64>> = rows.iter().map(ViewRecord::values).collect();
    check_arity(&records, T::COLUMNS.len())?;
    Ok(RecordSet {
        table: T::TABLE,
        columns: T::COLUMNS,
        records,
    })
}

/// Verifies that every record has `expected` values.
pub fn check_arity(records: &[Vec<i64>], expected: usize) -> Result<(), ConsistencyError> {
    match records
        .iter()
        .enumerate()
        .find(|(_, record)| record.len() != expected)
    {
        Some((record_index, record)) => Err(ConsistencyError {
            record_index,
            expected,
            actual: record.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_arity, to_records, ConsistencyError, VIEWS_TABLE};
    use crate::model::assignment::{BatchViewAssignment, ViewAssignment};

    #[test]
    fn view_rows_flatten_in_column_order() {
        let set = to_records(&[ViewAssignment {
            participant_id: 3,
            item_id: 7,
            view_order: 2,
        }])
        .unwrap();
        assert_eq!(set.table, VIEWS_TABLE);
        assert_eq!(set.columns, &["participant_id", "item_id", "view_order"]);
        assert_eq!(set.records, vec![vec![3, 7, 2]]);
    }

    #[test]
    fn batch_rows_carry_batch_id() {
        let set = to_records(&[BatchViewAssignment {
            participant_id: 1,
            batch_id: 4,
            item_id: 12,
            view_order: 9,
        }])
        .unwrap();
        assert_eq!(set.columns.len(), 4);
        assert_eq!(set.records, vec![vec![1, 12, 4, 9]]);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let err = check_arity(&[vec![1, 2, 3], vec![1, 2]], 3).unwrap_err();
        assert_eq!(
            err,
            ConsistencyError {
                record_index: 1,
                expected: 3,
                actual: 2
            }
        );
    }
}
