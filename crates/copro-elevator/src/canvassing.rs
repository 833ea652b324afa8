//! Who to talk to before the assembly, and in which order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::{BuildingCode, Unit, UnitId, UnitRegistry};
use crate::votes::{Confidence, VoteChoice, VoteRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPitch {
    pub priority: u8,
    pub group: String,
    pub argument: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvassingRules {
    pub elevator_building: BuildingCode,
    /// Pitch per floor of the elevator building; floors past the table use
    /// the ground-floor entry.
    pub floor_pitches: BTreeMap<u8, FloorPitch>,
    pub other_building_pitch: FloorPitch,
    /// Shares from which a unit gets one extra priority point.
    pub priority_bonus_shares: f64,
    pub large_share_threshold: f64,
    pub high_floor_threshold: u8,
}

impl Default for CanvassingRules {
    fn default() -> Self {
        let pitch = |priority: u8, group: &str, argument: &str| FloorPitch {
            priority,
            group: group.to_string(),
            argument: argument.to_string(),
        };

        let floor_pitches = BTreeMap::from([
            (
                0,
                pitch(2, "Ground floor", "Coefficient 0: the elevator costs nothing and adds value"),
            ),
            (
                1,
                pitch(3, "First floor", "Moderate cost, easier deliveries and accessibility"),
            ),
            (
                2,
                pitch(3, "Second floor", "Moderate cost, easier deliveries and accessibility"),
            ),
            (3, pitch(4, "Third floor", "Daily comfort, property value")),
            (4, pitch(4, "Fourth floor", "Daily comfort, property value")),
            (5, pitch(5, "Fifth floor", "Major beneficiary of the elevator")),
            (6, pitch(5, "Sixth floor", "Major beneficiary of the elevator")),
        ]);

        Self {
            elevator_building: BuildingCode::new("A"),
            floor_pitches,
            other_building_pitch: pitch(
                1,
                "Co-ownership solidarity",
                "Does not pay, supports the modernisation of the building",
            ),
            priority_bonus_shares: 200.0,
            large_share_threshold: 150.0,
            high_floor_threshold: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvassingTarget {
    pub unit_id: UnitId,
    pub building: BuildingCode,
    pub floor: u8,
    pub owners: Vec<String>,
    pub general_share: f64,
    pub choice: VoteChoice,
    pub confidence: Confidence,
    pub contact_made: bool,
    pub priority: u8,
    pub group: String,
    pub argument: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTag {
    Company,
    LargeShare,
    HighFloor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedTarget {
    pub unit_id: UnitId,
    pub building: BuildingCode,
    pub floor: u8,
    pub owners: Vec<String>,
    pub general_share: f64,
    pub tags: Vec<TargetTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvassingPlan {
    /// Units not yet favorable and certain, highest priority first.
    pub targets: Vec<CanvassingTarget>,
    /// Units outside the elevator building carrying at least one tag.
    pub other_building_targets: Vec<TaggedTarget>,
}

pub struct CanvassingPlanner {
    rules: CanvassingRules,
}

impl CanvassingPlanner {
    pub fn new(rules: CanvassingRules) -> Self {
        Self { rules }
    }

    pub fn plan(&self, registry: &UnitRegistry, records: &[VoteRecord]) -> CanvassingPlan {
        let mut targets: Vec<CanvassingTarget> = records
            .iter()
            .filter(|record| {
                !(record.choice == VoteChoice::Favorable
                    && record.confidence == Confidence::Certain)
            })
            .filter_map(|record| {
                let unit = registry.get(record.unit_id)?;
                Some(self.target(unit, record))
            })
            .collect();

        targets.sort_by(|left, right| {
            right
                .priority
                .cmp(&left.priority)
                .then_with(|| right.general_share.total_cmp(&left.general_share))
                .then_with(|| left.unit_id.cmp(&right.unit_id))
        });

        let mut other_building_targets: Vec<TaggedTarget> = registry
            .units()
            .iter()
            .filter(|unit| !unit.is_in(&self.rules.elevator_building))
            .filter_map(|unit| {
                let tags = self.tags(unit);
                if tags.is_empty() {
                    return None;
                }
                Some(TaggedTarget {
                    unit_id: unit.id,
                    building: unit.building.clone(),
                    floor: unit.floor,
                    owners: unit.owners.clone(),
                    general_share: unit.general_share,
                    tags,
                })
            })
            .collect();

        other_building_targets.sort_by(|left, right| {
            right
                .general_share
                .total_cmp(&left.general_share)
                .then_with(|| left.unit_id.cmp(&right.unit_id))
        });

        CanvassingPlan {
            targets,
            other_building_targets,
        }
    }

    fn pitch(&self, unit: &Unit) -> &FloorPitch {
        if !unit.is_in(&self.rules.elevator_building) {
            return &self.rules.other_building_pitch;
        }
        self.rules
            .floor_pitches
            .get(&unit.floor)
            .or_else(|| self.rules.floor_pitches.get(&0))
            .unwrap_or(&self.rules.other_building_pitch)
    }

    fn target(&self, unit: &Unit, record: &VoteRecord) -> CanvassingTarget {
        let pitch = self.pitch(unit);
        let bonus = u8::from(unit.general_share >= self.rules.priority_bonus_shares);

        CanvassingTarget {
            unit_id: unit.id,
            building: unit.building.clone(),
            floor: unit.floor,
            owners: unit.owners.clone(),
            general_share: unit.general_share,
            choice: record.choice,
            confidence: record.confidence,
            contact_made: record.contact_made,
            priority: pitch.priority + bonus,
            group: pitch.group.clone(),
            argument: pitch.argument.clone(),
        }
    }

    fn tags(&self, unit: &Unit) -> Vec<TargetTag> {
        let mut tags = Vec::new();
        if unit.has_company_owner() {
            tags.push(TargetTag::Company);
        }
        if unit.general_share >= self.rules.large_share_threshold {
            tags.push(TargetTag::LargeShare);
        }
        if unit.floor >= self.rules.high_floor_threshold {
            tags.push(TargetTag::HighFloor);
        }
        tags
    }
}
