use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::registry::{BuildingCode, UnitRegistry};

use super::config::VoteRules;
use super::domain::{Confidence, VoteChoice, VoteRecord};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChoiceTotal {
    pub choice: VoteChoice,
    pub count: usize,
    pub shares: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceTotal {
    pub confidence: Confidence,
    pub count: usize,
    pub shares: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingTally {
    pub building: BuildingCode,
    pub shares: f64,
    pub totals: Vec<ChoiceTotal>,
}

/// Denominator and thresholds one vote outcome is measured against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdScenario {
    pub label: String,
    pub total: f64,
    pub majority: f64,
    pub bridge: f64,
}

impl ThresholdScenario {
    pub fn co_ownership(rules: &VoteRules) -> Self {
        Self {
            label: "co-ownership".to_string(),
            total: rules.total_shares,
            majority: rules.majority,
            bridge: rules.bridge,
        }
    }

    /// Thresholds restricted to one building's shares.
    pub fn for_building(building: &BuildingCode, total: f64) -> Self {
        Self {
            label: format!("building {building}"),
            total,
            majority: (total / 2.0).floor() + 1.0,
            bridge: (total / 3.0).ceil(),
        }
    }

    pub fn evaluate(&self, favorable: f64) -> ScenarioOutcome {
        let majority_reached = favorable >= self.majority;
        let status = if majority_reached {
            ThresholdStatus::Majority
        } else if favorable >= self.bridge {
            ThresholdStatus::Bridge
        } else {
            ThresholdStatus::Insufficient
        };

        ScenarioOutcome {
            label: self.label.clone(),
            total: self.total,
            majority: self.majority,
            bridge: self.bridge,
            favorable,
            majority_reached,
            bridge_reached: status == ThresholdStatus::Bridge,
            shares_needed: (self.majority - favorable).max(0.0),
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStatus {
    Majority,
    /// One third reached without the majority: a second vote may follow.
    Bridge,
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub label: String,
    pub total: f64,
    pub majority: f64,
    pub bridge: f64,
    pub favorable: f64,
    pub majority_reached: bool,
    /// Set only when the bridge is met and the majority is not.
    pub bridge_reached: bool,
    pub shares_needed: f64,
    pub status: ThresholdStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projections {
    pub optimistic: f64,
    pub pessimistic: f64,
    pub realistic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyReport {
    pub totals: Vec<ChoiceTotal>,
    pub per_building: Vec<BuildingTally>,
    pub favorable_by_confidence: Vec<ConfidenceTotal>,
    pub co_ownership: ScenarioOutcome,
    pub building: ScenarioOutcome,
    pub projections: Projections,
}

impl TallyReport {
    pub fn shares(&self, choice: VoteChoice) -> f64 {
        self.totals
            .iter()
            .find(|total| total.choice == choice)
            .map_or(0.0, |total| total.shares)
    }

    pub fn counted_shares(&self) -> f64 {
        self.totals.iter().map(|total| total.shares).sum()
    }
}

#[derive(Default)]
struct Accumulator {
    choices: BTreeMap<VoteChoice, (usize, f64)>,
}

impl Accumulator {
    fn add(&mut self, choice: VoteChoice, shares: f64) {
        let entry = self.choices.entry(choice).or_default();
        entry.0 += 1;
        entry.1 += shares;
    }

    fn shares(&self, choice: VoteChoice) -> f64 {
        self.choices.get(&choice).map_or(0.0, |entry| entry.1)
    }

    fn totals(&self) -> Vec<ChoiceTotal> {
        VoteChoice::ALL
            .into_iter()
            .map(|choice| {
                let (count, shares) = self.choices.get(&choice).copied().unwrap_or_default();
                ChoiceTotal {
                    choice,
                    count,
                    shares,
                }
            })
            .collect()
    }
}

/// Aggregates vote records by choice, building and confidence.
///
/// Records whose unit is missing from the registry carry no shares and are
/// skipped.
pub fn tally(registry: &UnitRegistry, records: &[VoteRecord], rules: &VoteRules) -> TallyReport {
    let mut global = Accumulator::default();
    let mut buildings: BTreeMap<BuildingCode, Accumulator> = BTreeMap::new();
    let mut favorable: BTreeMap<Confidence, (usize, f64)> = BTreeMap::new();

    for record in records {
        let Some(unit) = registry.get(record.unit_id) else {
            warn!(unit_id = record.unit_id.0, "vote record without a unit, skipped");
            continue;
        };

        global.add(record.choice, unit.general_share);
        buildings
            .entry(unit.building.clone())
            .or_default()
            .add(record.choice, unit.general_share);

        if record.choice == VoteChoice::Favorable {
            let entry = favorable.entry(record.confidence).or_default();
            entry.0 += 1;
            entry.1 += unit.general_share;
        }
    }

    let favorable_shares = |confidence: Confidence| {
        favorable
            .get(&confidence)
            .map_or(0.0, |entry| entry.1)
    };
    let favorable_by_confidence = Confidence::ALL
        .into_iter()
        .map(|confidence| {
            let (count, shares) = favorable.get(&confidence).copied().unwrap_or_default();
            ConfidenceTotal {
                confidence,
                count,
                shares,
            }
        })
        .collect();

    let unknown = global.shares(VoteChoice::Unknown);
    // half shares round to even
    let projections = Projections {
        optimistic: (global.shares(VoteChoice::Favorable)
            + unknown
            + global.shares(VoteChoice::Absent))
        .round_ties_even(),
        pessimistic: favorable_shares(Confidence::Certain).round_ties_even(),
        realistic: (favorable_shares(Confidence::Certain)
            + favorable_shares(Confidence::Probable)
            + favorable_shares(Confidence::Possible)
            + rules.realistic_rate * unknown)
            .round_ties_even(),
    };

    let co_ownership =
        ThresholdScenario::co_ownership(rules).evaluate(global.shares(VoteChoice::Favorable));
    let building_favorable = buildings
        .get(&rules.scenario_building)
        .map_or(0.0, |accumulator| accumulator.shares(VoteChoice::Favorable));
    let building = ThresholdScenario::for_building(
        &rules.scenario_building,
        registry.building_shares(&rules.scenario_building),
    )
    .evaluate(building_favorable);

    let per_building = buildings
        .iter()
        .map(|(code, accumulator)| {
            let totals = accumulator.totals();
            BuildingTally {
                building: code.clone(),
                shares: totals.iter().map(|total| total.shares).sum(),
                totals,
            }
        })
        .collect();

    TallyReport {
        totals: global.totals(),
        per_building,
        favorable_by_confidence,
        co_ownership,
        building,
        projections,
    }
}
