use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::registry::{UnitId, UnitRegistry};

use super::config::VoteRules;
use super::domain::{Confidence, MutationOutcome, VoteChoice, VoteDetail, VoteRecord};
use super::repository::{StoreError, VoteRepository};
use super::seeding::seed_records;
use super::tally::{tally, TallyReport};

/// Vote detail rows together with their tally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteOverview {
    pub detail: Vec<VoteDetail>,
    pub tally: TallyReport,
}

/// Service composing the unit registry, the vote store and the vote rules.
pub struct VoteService<R> {
    repository: Arc<R>,
    registry: Arc<UnitRegistry>,
    rules: VoteRules,
}

impl<R> VoteService<R>
where
    R: VoteRepository + 'static,
{
    pub fn new(repository: Arc<R>, registry: Arc<UnitRegistry>, rules: VoteRules) -> Self {
        Self {
            repository,
            registry,
            rules,
        }
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &VoteRules {
        &self.rules
    }

    /// Seeds one record per unit unless records already exist.
    /// Returns the number of records created.
    pub fn initialize(&self) -> Result<usize, VoteServiceError> {
        let existing = self.repository.count()?;
        if existing > 0 {
            return Ok(0);
        }

        let records = seed_records(&self.registry, &self.rules);
        self.repository.insert_all(&records)?;
        info!(records = records.len(), "vote records seeded");
        Ok(records.len())
    }

    /// Deletes every record, then seeds again.
    pub fn reset(&self) -> Result<usize, VoteServiceError> {
        let removed = self.repository.clear()?;
        info!(removed, "vote records cleared");
        self.initialize()
    }

    pub fn records(&self) -> Result<Vec<VoteRecord>, VoteServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn tally(&self) -> Result<TallyReport, VoteServiceError> {
        let records = self.repository.list()?;
        Ok(tally(&self.registry, &records, &self.rules))
    }

    pub fn detail(&self) -> Result<Vec<VoteDetail>, VoteServiceError> {
        let records = self.repository.list()?;
        Ok(vote_detail(&self.registry, &records))
    }

    pub fn overview(&self) -> Result<VoteOverview, VoteServiceError> {
        let records = self.repository.list()?;
        Ok(VoteOverview {
            detail: vote_detail(&self.registry, &records),
            tally: tally(&self.registry, &records, &self.rules),
        })
    }

    /// Validates raw labels before touching storage.
    ///
    /// A missing or unknown `vote`, or an unknown `confidence`, is invalid
    /// input; a unit without a record is reported as `UnitNotFound`.
    pub fn update_vote(
        &self,
        unit_id: UnitId,
        vote: Option<&str>,
        confidence: Option<&str>,
    ) -> Result<MutationOutcome, VoteServiceError> {
        let label = vote
            .filter(|label| !label.trim().is_empty())
            .ok_or_else(|| VoteServiceError::InvalidInput("vote is required".to_string()))?;
        let choice = VoteChoice::parse(label)
            .ok_or_else(|| VoteServiceError::InvalidInput(format!("unknown vote `{label}`")))?;
        let confidence = match confidence.filter(|label| !label.trim().is_empty()) {
            Some(label) => Some(Confidence::parse(label).ok_or_else(|| {
                VoteServiceError::InvalidInput(format!("unknown confidence `{label}`"))
            })?),
            None => None,
        };

        self.set_vote(unit_id, choice, confidence)
    }

    pub fn set_vote(
        &self,
        unit_id: UnitId,
        choice: VoteChoice,
        confidence: Option<Confidence>,
    ) -> Result<MutationOutcome, VoteServiceError> {
        let outcome = self.repository.update_vote(unit_id, choice, confidence)?;
        log_mutation(unit_id, outcome, "vote updated");
        Ok(outcome)
    }

    pub fn update_contact(
        &self,
        unit_id: UnitId,
        contact_made: bool,
    ) -> Result<MutationOutcome, VoteServiceError> {
        let outcome = self.repository.update_contact(unit_id, contact_made)?;
        log_mutation(unit_id, outcome, "contact flag updated");
        Ok(outcome)
    }
}

/// Records joined with their unit, ordered by building, floor and location.
/// Records without a unit in the registry are left out.
pub fn vote_detail(registry: &UnitRegistry, records: &[VoteRecord]) -> Vec<VoteDetail> {
    let mut detail: Vec<VoteDetail> = records
        .iter()
        .filter_map(|record| {
            let unit = registry.get(record.unit_id)?;
            Some(VoteDetail {
                unit_id: unit.id,
                building: unit.building.clone(),
                floor: unit.floor,
                location: unit.location.clone(),
                general_share: unit.general_share,
                elevator_coefficient: unit.elevator_coefficient,
                elevator_share: unit.elevator_share,
                owners: unit.owners.clone(),
                board_member: unit.board_member,
                choice: record.choice,
                confidence: record.confidence,
                contact_made: record.contact_made,
                key_argument: record.key_argument.clone(),
            })
        })
        .collect();

    detail.sort_by(|left, right| {
        left.building
            .cmp(&right.building)
            .then_with(|| left.floor.cmp(&right.floor))
            .then_with(|| left.location.cmp(&right.location))
            .then_with(|| left.unit_id.cmp(&right.unit_id))
    });
    detail
}

fn log_mutation(unit_id: UnitId, outcome: MutationOutcome, message: &str) {
    match outcome {
        MutationOutcome::Applied => info!(unit_id = unit_id.0, "{message}"),
        MutationOutcome::UnitNotFound => warn!(unit_id = unit_id.0, "no vote record for unit"),
    }
}

/// Error raised by the vote service.
#[derive(Debug, thiserror::Error)]
pub enum VoteServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
