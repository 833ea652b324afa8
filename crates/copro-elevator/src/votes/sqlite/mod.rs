//! SQLite-backed vote store.
//!
//! A connection is opened for every operation and dropped afterwards; each
//! mutation is a single statement, bulk seeding is one transaction.

pub mod migrations;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rusqlite::{params, Connection, Row};
use tracing::{debug, error};

use crate::registry::UnitId;

use super::domain::{Confidence, MutationOutcome, VoteChoice, VoteRecord};
use super::repository::{StoreError, VoteRepository};

const UPDATED_NOW: &str = "strftime('%Y-%m-%dT%H:%M:%SZ', 'now')";

/// Opens the database file, configures the connection and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> Result<Connection, StoreError> {
    let started_at = Instant::now();
    let path = path.as_ref();

    let mut conn = Connection::open(path).map_err(|err| {
        error!(path = %path.display(), error = %err, "vote store open failed");
        StoreError::from(err)
    })?;
    bootstrap_connection(&mut conn)?;

    debug!(
        path = %path.display(),
        duration_ms = started_at.elapsed().as_millis() as u64,
        "vote store opened"
    );
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection) -> Result<(), StoreError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    migrations::apply_migrations(conn)
}

#[derive(Debug, Clone)]
pub struct SqliteVoteRepository {
    path: PathBuf,
}

impl SqliteVoteRepository {
    /// Creates the database and applies migrations eagerly so that a bad
    /// path or schema fails at startup rather than on the first request.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| StoreError::Unavailable(format!("{}: {err}", parent.display())))?;
        }
        open_db(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        open_db(&self.path)
    }
}

impl VoteRepository for SqliteVoteRepository {
    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM vote_records;", [], |row| {
            row.get(0)
        })?;
        usize::try_from(count).map_err(|_| StoreError::InvalidData(format!("count {count}")))
    }

    fn list(&self) -> Result<Vec<VoteRecord>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT unit_id, vote, confidence, contact_made, key_argument
             FROM vote_records
             ORDER BY unit_id;",
        )?;
        let rows = stmt.query_map([], parse_record_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row??);
        }
        Ok(records)
    }

    fn insert_all(&self, records: &[VoteRecord]) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO vote_records (unit_id, vote, confidence, contact_made, key_argument)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for record in records {
                stmt.execute(params![
                    record.unit_id.0,
                    record.choice.label(),
                    record.confidence.label(),
                    record.contact_made,
                    record.key_argument,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn update_vote(
        &self,
        unit_id: UnitId,
        choice: VoteChoice,
        confidence: Option<Confidence>,
    ) -> Result<MutationOutcome, StoreError> {
        let conn = self.connect()?;
        let changed = conn.execute(
            &format!(
                "UPDATE vote_records
                 SET vote = ?2,
                     confidence = COALESCE(?3, confidence),
                     updated_at = {UPDATED_NOW}
                 WHERE unit_id = ?1;"
            ),
            params![unit_id.0, choice.label(), confidence.map(Confidence::label)],
        )?;
        Ok(outcome(changed))
    }

    fn update_contact(
        &self,
        unit_id: UnitId,
        contact_made: bool,
    ) -> Result<MutationOutcome, StoreError> {
        let conn = self.connect()?;
        let changed = conn.execute(
            &format!(
                "UPDATE vote_records
                 SET contact_made = ?2,
                     updated_at = {UPDATED_NOW}
                 WHERE unit_id = ?1;"
            ),
            params![unit_id.0, contact_made],
        )?;
        Ok(outcome(changed))
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        Ok(conn.execute("DELETE FROM vote_records;", [])?)
    }
}

fn outcome(changed: usize) -> MutationOutcome {
    if changed == 0 {
        MutationOutcome::UnitNotFound
    } else {
        MutationOutcome::Applied
    }
}

fn parse_record_row(row: &Row<'_>) -> rusqlite::Result<Result<VoteRecord, StoreError>> {
    let unit_id: u32 = row.get(0)?;
    let vote: String = row.get(1)?;
    let confidence: String = row.get(2)?;
    let contact_made: bool = row.get(3)?;
    let key_argument: String = row.get(4)?;

    Ok(parse_record(unit_id, &vote, &confidence, contact_made, key_argument))
}

fn parse_record(
    unit_id: u32,
    vote: &str,
    confidence: &str,
    contact_made: bool,
    key_argument: String,
) -> Result<VoteRecord, StoreError> {
    let choice = VoteChoice::parse(vote)
        .ok_or_else(|| StoreError::InvalidData(format!("unit {unit_id}: vote `{vote}`")))?;
    let confidence = Confidence::parse(confidence).ok_or_else(|| {
        StoreError::InvalidData(format!("unit {unit_id}: confidence `{confidence}`"))
    })?;

    Ok(VoteRecord {
        unit_id: UnitId(unit_id),
        choice,
        confidence,
        contact_made,
        key_argument,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, choice: VoteChoice) -> VoteRecord {
        VoteRecord {
            unit_id: UnitId(id),
            choice,
            confidence: Confidence::Unknown,
            contact_made: false,
            key_argument: "Daily comfort".to_string(),
        }
    }

    #[test]
    fn partial_update_keeps_confidence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = SqliteVoteRepository::open(dir.path().join("votes.sqlite3")).expect("open");
        repo.insert_all(&[record(1, VoteChoice::Unknown), record(2, VoteChoice::Opposed)])
            .expect("seed");

        repo.update_vote(UnitId(1), VoteChoice::Favorable, Some(Confidence::Certain))
            .expect("update");
        repo.update_vote(UnitId(1), VoteChoice::Abstaining, None)
            .expect("update");

        let records = repo.list().expect("list");
        assert_eq!(records[0].choice, VoteChoice::Abstaining);
        assert_eq!(records[0].confidence, Confidence::Certain);
        assert_eq!(records[1].choice, VoteChoice::Opposed);
    }

    #[test]
    fn mutations_on_missing_units_report_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = SqliteVoteRepository::open(dir.path().join("votes.sqlite3")).expect("open");

        let outcome = repo
            .update_vote(UnitId(42), VoteChoice::Favorable, None)
            .expect("statement runs");
        assert_eq!(outcome, MutationOutcome::UnitNotFound);
        assert_eq!(
            repo.update_contact(UnitId(42), true).expect("statement runs"),
            MutationOutcome::UnitNotFound
        );
    }

    #[test]
    fn duplicate_seed_rolls_back_the_whole_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = SqliteVoteRepository::open(dir.path().join("votes.sqlite3")).expect("open");

        let result = repo.insert_all(&[record(1, VoteChoice::Unknown), record(1, VoteChoice::Absent)]);
        assert!(matches!(result, Err(StoreError::Sqlite(_))));
        assert_eq!(repo.count().expect("count"), 0);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("future.sqlite3");
        let conn = Connection::open(&path).expect("raw open");
        conn.execute_batch("PRAGMA user_version = 99;").expect("pragma");
        drop(conn);

        match open_db(&path) {
            Err(StoreError::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            }) => {
                assert_eq!(db_version, 99);
                assert_eq!(latest_supported, migrations::latest_version());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
