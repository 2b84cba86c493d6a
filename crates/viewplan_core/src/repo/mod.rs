//! Storage-facing collaborators of the plan generators.
//!
//! # Responsibility
//! - Supply the ordered participant pool.
//! - Bulk-insert materialized records.
//!
//! # Invariants
//! - Participant ids are returned ascending.
//! - A bulk insert is all-or-nothing.

use crate::db::DbError;
use crate::materialize::ConsistencyError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod participant_repo;
pub mod view_repo;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Record width differs from the declared columns.
    Consistency(ConsistencyError),
    /// Table or column name is not a plain SQL identifier.
    InvalidIdentifier(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Consistency(err) => write!(f, "{err}"),
            Self::InvalidIdentifier(name) => write!(f, "invalid sql identifier `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Consistency(err) => Some(err),
            Self::InvalidIdentifier(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ConsistencyError> for RepoError {
    fn from(value: ConsistencyError) -> Self {
        Self::Consistency(value)
    }
}

pub(crate) fn table_exists(conn: &rusqlite::Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
