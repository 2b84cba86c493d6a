//! Participant pool source.
//!
//! # Responsibility
//! - Return the sorted participant ids the generators draw from.
//! - Register anonymous participants for a new study or a mirrored cohort.
//!
//! # Invariants
//! - `participant_ids()` is ascending and duplicate-free.
//! - Registered labels are `participant{id}`.

use super::{table_exists, RepoError, RepoResult};
use crate::model::assignment::ParticipantId;
use log::{info, warn};
use rusqlite::{params, Connection};

/// Ordered participant pool.
pub trait ParticipantSource {
    /// All known participant ids, ascending.
    fn participant_ids(&self) -> RepoResult<Vec<ParticipantId>>;
}

impl ParticipantSource for Vec<ParticipantId> {
    fn participant_ids(&self) -> RepoResult<Vec<ParticipantId>> {
        let mut ids = self.clone();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

/// SQLite-backed participant pool.
pub struct SqliteParticipantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParticipantRepository<'conn> {
    /// Wraps a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "participants")? {
            return Err(RepoError::InvalidData(
                "participants table is missing; open the database with open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }

    /// Number of registered participants.
    pub fn count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM participants;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative participant count {count}")))
    }

    /// Appends `count` participants after the current highest id.
    ///
    /// Returns the new ids in ascending order. Warns when the pool was not
    /// empty, since plans generated earlier do not cover the newcomers.
    pub fn register_participants(&self, count: usize) -> RepoResult<Vec<ParticipantId>> {
        let existing = self.count()?;
        if existing > 0 {
            warn!(
                "event=participants_register module=repo status=warn existing={existing} message=pool_not_empty"
            );
        }

        let first: ParticipantId = self.conn.query_row(
            "SELECT COALESCE(MAX(id), 0) + 1 FROM participants;",
            [],
            |row| row.get(0),
        )?;

        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(count);
        {
            let mut stmt = tx.prepare("INSERT INTO participants (id, label) VALUES (?1, ?2);")?;
            for id in first..first + count as i64 {
                stmt.execute(params![id, format!("participant{id}")])?;
                ids.push(id);
            }
        }
        tx.commit()?;

        info!(
            "event=participants_register module=repo status=ok count={count} first_id={first}"
        );
        Ok(ids)
    }
}

impl SqliteParticipantRepository<'_> {
    /// Registers every id in `ids` missing from the pool, keeping existing
    /// rows untouched. Returns how many participants were added.
    pub fn ensure_participants(&self, ids: &[ParticipantId]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut added = 0;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO participants (id, label) VALUES (?1, ?2);")?;
            for &id in ids {
                added += stmt.execute(params![id, format!("participant{id}")])?;
            }
        }
        tx.commit()?;

        info!(
            "event=participants_ensure module=repo status=ok requested={} added={added}",
            ids.len()
        );
        Ok(added)
    }
}

impl ParticipantSource for SqliteParticipantRepository<'_> {
    fn participant_ids(&self) -> RepoResult<Vec<ParticipantId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM participants ORDER BY id ASC;")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, ParticipantId>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
