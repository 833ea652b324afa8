use crate::registry::{Unit, UnitRegistry};

use super::config::VoteRules;
use super::domain::{Confidence, VoteChoice, VoteRecord};

const PROJECT_CHAMPION: &str = "Project champion";
const MAJOR_BENEFICIARY: &str = "Major beneficiary";
const DAILY_COMFORT: &str = "Daily comfort";
const NO_COST: &str = "No cost (coefficient 0)";
const MODERATE_COST: &str = "Moderate cost, property value";
const NOT_PAYING: &str = "Does not pay, building modernisation";

/// Initial vote record for every unit of the registry, in registry order.
pub fn seed_records(registry: &UnitRegistry, rules: &VoteRules) -> Vec<VoteRecord> {
    registry
        .units()
        .iter()
        .map(|unit| seed_record(unit, rules))
        .collect()
}

/// First matching rule wins: board member, then the scenario building by
/// floor, then everyone else.
pub fn seed_record(unit: &Unit, rules: &VoteRules) -> VoteRecord {
    let (choice, confidence, key_argument) = if unit.board_member {
        (VoteChoice::Favorable, Confidence::Certain, PROJECT_CHAMPION)
    } else if unit.is_in(&rules.scenario_building) {
        match unit.floor {
            floor if floor >= rules.major_beneficiary_floor => {
                (VoteChoice::Favorable, Confidence::Probable, MAJOR_BENEFICIARY)
            }
            floor if floor >= rules.comfort_floor => {
                (VoteChoice::Favorable, Confidence::Probable, DAILY_COMFORT)
            }
            0 => (VoteChoice::Favorable, Confidence::Possible, NO_COST),
            _ => (VoteChoice::Unknown, Confidence::Unknown, MODERATE_COST),
        }
    } else {
        (VoteChoice::Unknown, Confidence::Unknown, NOT_PAYING)
    };

    VoteRecord {
        unit_id: unit.id,
        choice,
        confidence,
        contact_made: false,
        key_argument: key_argument.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{BuildingCode, UnitId};

    fn unit(building: &str, floor: u8, board_member: bool) -> Unit {
        Unit {
            id: UnitId(1),
            building: BuildingCode::new(building),
            floor,
            location: String::new(),
            general_share: 100.0,
            elevator_coefficient: 0.0,
            elevator_share: None,
            owners: Vec::new(),
            board_member,
        }
    }

    fn seeded(building: &str, floor: u8, board_member: bool) -> (VoteChoice, Confidence, String) {
        let record = seed_record(&unit(building, floor, board_member), &VoteRules::default());
        (record.choice, record.confidence, record.key_argument)
    }

    #[test]
    fn board_members_are_certain_whatever_the_building() {
        let (choice, confidence, argument) = seeded("B", 1, true);
        assert_eq!((choice, confidence), (VoteChoice::Favorable, Confidence::Certain));
        assert_eq!(argument, PROJECT_CHAMPION);
    }

    #[test]
    fn elevator_building_rules_follow_the_floor() {
        assert_eq!(
            seeded("A", 6, false),
            (
                VoteChoice::Favorable,
                Confidence::Probable,
                MAJOR_BENEFICIARY.to_string()
            )
        );
        assert_eq!(seeded("A", 3, false).1, Confidence::Probable);
        assert_eq!(seeded("A", 3, false).2, DAILY_COMFORT);
        assert_eq!(
            (seeded("A", 0, false).0, seeded("A", 0, false).1),
            (VoteChoice::Favorable, Confidence::Possible)
        );
        assert_eq!(
            (seeded("A", 2, false).0, seeded("A", 2, false).1),
            (VoteChoice::Unknown, Confidence::Unknown)
        );
    }

    #[test]
    fn other_buildings_start_unknown() {
        let (choice, confidence, argument) = seeded("C", 5, false);
        assert_eq!((choice, confidence), (VoteChoice::Unknown, Confidence::Unknown));
        assert_eq!(argument, NOT_PAYING);
    }
}
