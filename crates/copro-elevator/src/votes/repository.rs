use crate::registry::UnitId;

use super::domain::{Confidence, MutationOutcome, VoteChoice, VoteRecord};

/// Storage abstraction for vote records, keyed by unit.
pub trait VoteRepository: Send + Sync {
    fn count(&self) -> Result<usize, StoreError>;
    /// All records ordered by unit id.
    fn list(&self) -> Result<Vec<VoteRecord>, StoreError>;
    /// Inserts every record atomically.
    fn insert_all(&self, records: &[VoteRecord]) -> Result<(), StoreError>;
    /// Keeps the stored confidence when `confidence` is `None`.
    fn update_vote(
        &self,
        unit_id: UnitId,
        choice: VoteChoice,
        confidence: Option<Confidence>,
    ) -> Result<MutationOutcome, StoreError>;
    fn update_contact(
        &self,
        unit_id: UnitId,
        contact_made: bool,
    ) -> Result<MutationOutcome, StoreError>;
    /// Deletes every record, returning how many were removed.
    fn clear(&self) -> Result<usize, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("vote store unavailable: {0}")]
    Unavailable(String),
}
