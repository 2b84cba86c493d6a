//! Bulk persistence of materialized view records.
//!
//! # Responsibility
//! - Insert one generation run: its audit row plus every record, tagged with
//!   the run id.
//!
//! # Invariants
//! - The audit row and its records commit together or not at all.
//! - Every record matches the declared column count, or nothing is written.
//! - Table and column names are plain identifiers; values are always bound.

use super::{RepoError, RepoResult};
use crate::materialize::{check_arity, RecordSet};
use crate::model::run::AssignmentRun;
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

/// Column tying each stored record to its `assignment_runs` row.
pub const RUN_COLUMN: &str = "run_uuid";

/// Persistence capability for generation runs.
pub trait ViewSink {
    /// Stores `run` and `records` as one unit; returns records written.
    fn insert_run(&self, run: &AssignmentRun, records: &RecordSet) -> RepoResult<usize>;
}

/// SQLite-backed sink.
pub struct SqliteViewSink<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteViewSink<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ViewSink for SqliteViewSink<'_> {
    fn insert_run(&self, run: &AssignmentRun, records: &RecordSet) -> RepoResult<usize> {
        let table = records.table;
        ensure_identifier(table)?;
        for column in records.columns {
            ensure_identifier(column)?;
        }
        check_arity(&records.records, records.columns.len())?;
        if run.row_count != records.len() {
            return Err(RepoError::InvalidData(format!(
                "run {} declares {} rows but {} records were given",
                run.id,
                run.row_count,
                records.len()
            )));
        }
        let row_count = i64::try_from(run.row_count)
            .map_err(|_| RepoError::InvalidData(format!("row count {} overflows", run.row_count)))?;
        let run_id = run.id.to_string();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO assignment_runs (uuid, kind, params, row_count)
             VALUES (?1, ?2, ?3, ?4);",
            params![run_id, run.kind.as_str(), run.params.as_str(), row_count],
        )?;

        if records.is_empty() {
            warn!(
                "event=records_insert module=repo status=skip table={table} run_id={run_id} reason=no_records"
            );
        } else {
            let placeholders = (1..=records.columns.len() + 1)
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO {table} ({}, {RUN_COLUMN}) VALUES ({placeholders});",
                records.columns.join(", ")
            );
            let mut stmt = tx.prepare(&sql)?;
            for record in &records.records {
                let values = record
                    .iter()
                    .map(|&value| Value::Integer(value))
                    .chain(std::iter::once(Value::Text(run_id.clone())));
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        info!(
            "event=records_insert module=repo status=ok table={table} run_id={run_id} kind={} count={}",
            run.kind.as_str(),
            records.len()
        );
        Ok(records.len())
    }
}

fn ensure_identifier(name: &str) -> RepoResult<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(RepoError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::ensure_identifier;

    #[test]
    fn identifiers_must_be_plain() {
        assert!(ensure_identifier("participant_views").is_ok());
        assert!(ensure_identifier("_t1").is_ok());
        assert!(ensure_identifier("").is_err());
        assert!(ensure_identifier("1table").is_err());
        assert!(ensure_identifier("views; DROP TABLE x").is_err());
    }
}
