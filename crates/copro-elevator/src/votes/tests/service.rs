use super::common::*;
use std::sync::Arc;

use crate::registry::UnitId;
use crate::votes::{Confidence, MutationOutcome, VoteChoice, VoteService, VoteServiceError};

#[test]
fn initialize_seeds_every_unit_once() {
    let (service, repository) = build_service();

    assert_eq!(service.initialize().expect("seeding succeeds"), 7);
    assert_eq!(service.initialize().expect("second call is a no-op"), 0);
    assert_eq!(repository.records.lock().expect("mutex").len(), 7);

    let records = service.records().expect("records");
    let board = records
        .iter()
        .find(|record| record.unit_id == UnitId(5))
        .expect("board member seeded");
    assert_eq!(board.choice, VoteChoice::Favorable);
    assert_eq!(board.confidence, Confidence::Certain);
}

#[test]
fn reset_discards_edits_and_reseeds_identically() {
    let (service, _) = build_service();
    service.initialize().expect("seeding succeeds");
    let seeded = service.records().expect("records");

    service
        .update_vote(UnitId(2), Some("opposed"), Some("certain"))
        .expect("update succeeds");
    service.update_contact(UnitId(6), true).expect("contact");

    assert_eq!(service.reset().expect("reset"), 7);
    let first = service.records().expect("records");
    service.reset().expect("reset again");
    let second = service.records().expect("records");

    assert_eq!(first, seeded);
    assert_eq!(first, second);
}

#[test]
fn update_vote_rejects_missing_or_unknown_labels_before_storage() {
    let (service, repository) = build_service();
    service.initialize().expect("seeding succeeds");
    let before = service.records().expect("records");

    for (vote, confidence) in [
        (None, None),
        (Some("  "), None),
        (Some("maybe"), None),
        (Some("favorable"), Some("sure")),
    ] {
        let error = service
            .update_vote(UnitId(2), vote, confidence)
            .expect_err("invalid input");
        assert!(matches!(error, VoteServiceError::InvalidInput(_)));
    }

    let after: Vec<_> = repository
        .records
        .lock()
        .expect("mutex")
        .values()
        .cloned()
        .collect();
    assert_eq!(before, after);
}

#[test]
fn update_vote_without_confidence_keeps_the_stored_one() {
    let (service, _) = build_service();
    service.initialize().expect("seeding succeeds");

    let outcome = service
        .update_vote(UnitId(3), Some("Opposed"), None)
        .expect("update succeeds");
    assert_eq!(outcome, MutationOutcome::Applied);

    let record = service
        .records()
        .expect("records")
        .into_iter()
        .find(|record| record.unit_id == UnitId(3))
        .expect("record exists");
    assert_eq!(record.choice, VoteChoice::Opposed);
    assert_eq!(record.confidence, Confidence::Probable);
}

#[test]
fn mutations_on_units_without_records_report_not_found() {
    let (service, _) = build_service();

    let outcome = service
        .update_vote(UnitId(2), Some("favorable"), None)
        .expect("not found is not an error");
    assert_eq!(outcome, MutationOutcome::UnitNotFound);
    assert!(!outcome.is_applied());
    assert_eq!(
        service.update_contact(UnitId(99), true).expect("contact"),
        MutationOutcome::UnitNotFound
    );
}

#[test]
fn detail_is_ordered_by_building_floor_and_location() {
    let (service, _) = build_service();
    service.initialize().expect("seeding succeeds");

    let detail = service.detail().expect("detail");
    let order: Vec<u32> = detail.iter().map(|row| row.unit_id.0).collect();
    assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(detail[3].key_argument, "Major beneficiary");
    assert_eq!(detail[5].building.as_str(), "B");
}

#[test]
fn storage_failures_propagate() {
    let service = VoteService::new(Arc::new(UnavailableRepository), registry(), rules());
    assert!(matches!(
        service.initialize(),
        Err(VoteServiceError::Store(_))
    ));
    assert!(matches!(service.tally(), Err(VoteServiceError::Store(_))));
}
