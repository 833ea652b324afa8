//! Vote tracking for the general assembly.
//!
//! Records are seeded once from the unit registry, edited one unit at a
//! time, and tallied against the statutory thresholds of two scenarios:
//! the whole co-ownership and the elevator building alone.

mod config;
pub mod domain;
pub mod repository;
pub mod router;
pub mod seeding;
pub mod service;
pub mod sqlite;
pub mod tally;

#[cfg(test)]
mod tests;

pub use config::VoteRules;
pub use domain::{Confidence, MutationOutcome, VoteChoice, VoteDetail, VoteRecord};
pub use repository::{StoreError, VoteRepository};
pub use router::{vote_router, ContactUpdateRequest, VoteUpdateRequest};
pub use seeding::{seed_record, seed_records};
pub use service::{vote_detail, VoteOverview, VoteService, VoteServiceError};
pub use sqlite::SqliteVoteRepository;
pub use tally::{
    tally, BuildingTally, ChoiceTotal, ConfidenceTotal, Projections, ScenarioOutcome,
    TallyReport, ThresholdScenario, ThresholdStatus,
};
