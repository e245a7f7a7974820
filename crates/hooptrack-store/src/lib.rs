//! SQLite persistence for session records. The daemon writes once per
//! tick; a separate viewer reads live progress from the same file.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

use hooptrack_core::types::{SessionRecord, SessionStatus};

/// Store-level error alias, so callers don't need a rusqlite
/// dependency of their own.
pub use rusqlite::Error as StoreError;

const RECORD_COLUMNS: &str = "id, shots_taken, shots_made, shots_missed, streak, \
     highest_streak, started_at, time_of_session, status";

/// SQLite-backed store for session records.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a database at the given filesystem path and
    /// run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database. Useful for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Create the schema if it does not already exist.
    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id              INTEGER PRIMARY KEY,
                shots_taken     INTEGER NOT NULL DEFAULT 0,
                shots_made      INTEGER NOT NULL DEFAULT 0,
                shots_missed    INTEGER NOT NULL DEFAULT 0,
                streak          INTEGER NOT NULL DEFAULT 0,
                highest_streak  INTEGER NOT NULL DEFAULT 0,
                started_at      TEXT NOT NULL,
                time_of_session REAL NOT NULL DEFAULT 0.0,
                status          TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Insert the zeroed record for a freshly started session.
    pub fn insert_session(&self, record: &SessionRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions
                (id, shots_taken, shots_made, shots_missed, streak,
                 highest_streak, started_at, time_of_session, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.shots_taken,
                record.shots_made,
                record.shots_missed,
                record.streak,
                record.highest_streak,
                record.started_at.to_rfc3339(),
                record.time_of_session_secs,
                record.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Write the per-tick statistics fields for one session. Never
    /// touches status or started_at.
    pub fn update_progress(&self, record: &SessionRecord) -> Result<()> {
        self.conn.execute(
            "UPDATE sessions
             SET shots_taken = ?2, shots_made = ?3, shots_missed = ?4,
                 streak = ?5, highest_streak = ?6, time_of_session = ?7
             WHERE id = ?1",
            params![
                record.id,
                record.shots_taken,
                record.shots_made,
                record.shots_missed,
                record.streak,
                record.highest_streak,
                record.time_of_session_secs,
            ],
        )?;
        Ok(())
    }

    /// Transition a session's stored status to complete.
    pub fn mark_complete(&self, id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE sessions SET status = ?2 WHERE id = ?1",
            params![id, SessionStatus::Complete.as_str()],
        )?;
        Ok(())
    }

    /// The record with the highest id, if any session was ever stored.
    pub fn latest_session(&self) -> Result<Option<SessionRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM sessions ORDER BY id DESC LIMIT 1"),
                [],
                row_to_record,
            )
            .optional()
    }

    /// All session records, ordered by id ascending.
    pub fn all_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {RECORD_COLUMNS} FROM sessions ORDER BY id ASC"))?;
        let rows = stmt.query_map([], row_to_record)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

fn row_to_record(row: &Row<'_>) -> Result<SessionRecord> {
    let started_at_str: String = row.get(6)?;
    let status_str: String = row.get(8)?;

    let started_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&started_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());
    let status: SessionStatus = status_str.parse().unwrap_or(SessionStatus::Active);

    Ok(SessionRecord {
        id: row.get(0)?,
        shots_taken: row.get(1)?,
        shots_made: row.get(2)?,
        shots_missed: row.get(3)?,
        streak: row.get(4)?,
        highest_streak: row.get(5)?,
        started_at,
        time_of_session_secs: row.get(7)?,
        status,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_record(id: i64) -> SessionRecord {
        let started_at = Utc.with_ymd_and_hms(2026, 8, 30, 18, 0, 0).unwrap();
        SessionRecord::new(id, started_at)
    }

    #[test]
    fn empty_store_has_no_latest() {
        let store = Store::open_in_memory().expect("open");
        assert!(store.latest_session().expect("query").is_none());
        assert!(store.all_sessions().expect("query").is_empty());
    }

    #[test]
    fn insert_and_read_back() {
        let store = Store::open_in_memory().expect("open");
        let record = make_record(1);
        store.insert_session(&record).expect("insert");

        let loaded = store.latest_session().expect("query").expect("present");
        assert_eq!(loaded, record);
    }

    #[test]
    fn latest_picks_highest_id() {
        let store = Store::open_in_memory().expect("open");
        for id in 1..=3 {
            store.insert_session(&make_record(id)).expect("insert");
        }
        let latest = store.latest_session().expect("query").expect("present");
        assert_eq!(latest.id, 3);
    }

    #[test]
    fn all_sessions_ordered_by_id() {
        let store = Store::open_in_memory().expect("open");
        // Insert out of order; ids, not insert order, drive the sort.
        for id in [2, 1, 3] {
            store.insert_session(&make_record(id)).expect("insert");
        }
        let ids: Vec<i64> = store
            .all_sessions()
            .expect("query")
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn update_progress_leaves_status_and_start_alone() {
        let store = Store::open_in_memory().expect("open");
        let mut record = make_record(1);
        store.insert_session(&record).expect("insert");

        record.shots_taken = 5;
        record.shots_made = 3;
        record.shots_missed = 2;
        record.streak = 2;
        record.highest_streak = 3;
        record.time_of_session_secs = 42.5;
        store.update_progress(&record).expect("update");

        let loaded = store.latest_session().expect("query").expect("present");
        assert_eq!(loaded.shots_taken, 5);
        assert_eq!(loaded.shots_made, 3);
        assert_eq!(loaded.shots_missed, 2);
        assert_eq!(loaded.streak, 2);
        assert_eq!(loaded.highest_streak, 3);
        assert_eq!(loaded.time_of_session_secs, 42.5);
        assert_eq!(loaded.status, SessionStatus::Active);
        assert_eq!(loaded.started_at, record.started_at);
    }

    #[test]
    fn mark_complete_transitions_status_only() {
        let store = Store::open_in_memory().expect("open");
        let mut record = make_record(1);
        record.shots_taken = 7;
        store.insert_session(&record).expect("insert");

        store.mark_complete(1).expect("complete");

        let loaded = store.latest_session().expect("query").expect("present");
        assert_eq!(loaded.status, SessionStatus::Complete);
        assert_eq!(loaded.shots_taken, 7);
    }

    #[test]
    fn duplicate_id_insert_is_rejected() {
        let store = Store::open_in_memory().expect("open");
        store.insert_session(&make_record(1)).expect("insert");
        assert!(store.insert_session(&make_record(1)).is_err());
    }

    #[test]
    fn open_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sessions.db");

        {
            let store = Store::open(&path).expect("open");
            store.insert_session(&make_record(1)).expect("insert");
            store.mark_complete(1).expect("complete");
        }

        let store = Store::open(&path).expect("reopen");
        let loaded = store.latest_session().expect("query").expect("present");
        assert_eq!(loaded.id, 1);
        assert_eq!(loaded.status, SessionStatus::Complete);
    }

    #[test]
    fn timestamps_round_trip() {
        let store = Store::open_in_memory().expect("open");
        let record = make_record(1);
        store.insert_session(&record).expect("insert");
        let loaded = store.latest_session().expect("query").expect("present");
        assert_eq!(loaded.started_at, record.started_at);
    }
}
