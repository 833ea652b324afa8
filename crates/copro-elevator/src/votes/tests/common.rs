use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::registry::{BuildingCode, Unit, UnitId, UnitRegistry};
use crate::votes::{
    Confidence, MutationOutcome, StoreError, VoteChoice, VoteRecord, VoteRepository, VoteRules,
    VoteService,
};

pub(super) fn unit(id: u32, building: &str, floor: u8, share: f64, board_member: bool) -> Unit {
    let coefficient = if building == "A" && floor > 0 {
        0.5 + f64::from(floor) * 0.5
    } else {
        0.0
    };
    Unit {
        id: UnitId(id),
        building: BuildingCode::new(building),
        floor,
        location: format!("Door {id}"),
        general_share: share,
        elevator_coefficient: coefficient,
        elevator_share: Some(share * coefficient / 10.0),
        owners: vec![format!("Owner {id}")],
        board_member,
    }
}

/// Small co-ownership: building A of 1000 shares, building B of 500.
pub(super) fn registry() -> Arc<UnitRegistry> {
    Arc::new(
        UnitRegistry::new(vec![
            unit(1, "A", 0, 150.0, false),
            unit(2, "A", 1, 150.0, false),
            unit(3, "A", 3, 200.0, false),
            unit(4, "A", 5, 250.0, false),
            unit(5, "A", 6, 250.0, true),
            unit(6, "B", 2, 300.0, false),
            unit(7, "B", 4, 200.0, false),
        ])
        .expect("valid registry"),
    )
}

pub(super) fn rules() -> VoteRules {
    VoteRules {
        total_shares: 1500.0,
        majority: 751.0,
        bridge: 500.0,
        ..VoteRules::default()
    }
}

pub(super) fn build_service() -> (VoteService<MemoryVoteRepository>, Arc<MemoryVoteRepository>) {
    let repository = Arc::new(MemoryVoteRepository::default());
    let service = VoteService::new(repository.clone(), registry(), rules());
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

#[derive(Default, Clone)]
pub(super) struct MemoryVoteRepository {
    pub(super) records: Arc<Mutex<BTreeMap<UnitId, VoteRecord>>>,
}

impl VoteRepository for MemoryVoteRepository {
    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.lock().expect("repository mutex poisoned").len())
    }

    fn list(&self) -> Result<Vec<VoteRecord>, StoreError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn insert_all(&self, records: &[VoteRecord]) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if records.iter().any(|record| guard.contains_key(&record.unit_id)) {
            return Err(StoreError::Unavailable("duplicate unit".to_string()));
        }
        for record in records {
            guard.insert(record.unit_id, record.clone());
        }
        Ok(())
    }

    fn update_vote(
        &self,
        unit_id: UnitId,
        choice: VoteChoice,
        confidence: Option<Confidence>,
    ) -> Result<MutationOutcome, StoreError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&unit_id) {
            Some(record) => {
                record.choice = choice;
                if let Some(confidence) = confidence {
                    record.confidence = confidence;
                }
                Ok(MutationOutcome::Applied)
            }
            None => Ok(MutationOutcome::UnitNotFound),
        }
    }

    fn update_contact(
        &self,
        unit_id: UnitId,
        contact_made: bool,
    ) -> Result<MutationOutcome, StoreError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&unit_id) {
            Some(record) => {
                record.contact_made = contact_made;
                Ok(MutationOutcome::Applied)
            }
            None => Ok(MutationOutcome::UnitNotFound),
        }
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let removed = guard.len();
        guard.clear();
        Ok(removed)
    }
}

pub(super) struct UnavailableRepository;

impl VoteRepository for UnavailableRepository {
    fn count(&self) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<VoteRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn insert_all(&self, _records: &[VoteRecord]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_vote(
        &self,
        _unit_id: UnitId,
        _choice: VoteChoice,
        _confidence: Option<Confidence>,
    ) -> Result<MutationOutcome, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_contact(
        &self,
        _unit_id: UnitId,
        _contact_made: bool,
    ) -> Result<MutationOutcome, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn clear(&self) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}
