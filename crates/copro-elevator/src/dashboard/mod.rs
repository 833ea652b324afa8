//! Project-wide view combining every calculation over one data snapshot.

pub mod router;
mod simulation;

pub use router::dashboard_router;
pub use simulation::{RejectedTakeOver, SimulationError, SimulationOutcome, SimulationRequest};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::apportionment::{Apportioner, Apportionment, WeightOverrides};
use crate::canvassing::{CanvassingPlan, CanvassingPlanner};
use crate::config::ProjectRules;
use crate::quotes::{Quote, QuoteComparator, QuoteComparison};
use crate::registry::{BuildingCode, UnitRegistry};
use crate::votes::{tally, vote_detail, TallyReport, VoteDetail, VoteRecord};

/// Apportionment of one comparable quote's post-tax cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSimulation {
    pub vendor: String,
    pub recommended: bool,
    pub apportionment: Apportionment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardConstants {
    pub total_shares: f64,
    pub majority: f64,
    pub bridge: f64,
    pub scenario_building: BuildingCode,
    pub scenario_building_shares: f64,
    pub elevator_buildings: Vec<BuildingCode>,
    pub default_step: f64,
    pub horizon_years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub constants: DashboardConstants,
    pub comparison: QuoteComparison,
    pub simulations: Vec<QuoteSimulation>,
    pub tally: TallyReport,
    pub votes: Vec<VoteDetail>,
    pub canvassing: CanvassingPlan,
}

/// Reference data plus the rules every calculation runs with.
pub struct Project {
    registry: Arc<UnitRegistry>,
    quotes: Vec<Quote>,
    rules: ProjectRules,
}

impl Project {
    pub fn new(registry: Arc<UnitRegistry>, quotes: Vec<Quote>, rules: ProjectRules) -> Self {
        Self {
            registry,
            quotes,
            rules,
        }
    }

    pub fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn rules(&self) -> &ProjectRules {
        &self.rules
    }

    pub fn compare_quotes(&self) -> QuoteComparison {
        QuoteComparator::new(self.rules.comparison.clone()).compare(&self.quotes)
    }

    fn apportioner(&self) -> Apportioner {
        Apportioner::new(self.rules.apportionment.clone())
    }

    /// One apportionment per comparable quote, at the default step.
    pub fn quote_simulations(&self, comparison: &QuoteComparison) -> Vec<QuoteSimulation> {
        let apportioner = self.apportioner();
        comparison
            .comparables
            .iter()
            .filter_map(|scored| {
                let amount = scored.quote.posttax_cost?;
                Some(QuoteSimulation {
                    vendor: scored.quote.vendor.clone(),
                    recommended: comparison.recommended.as_deref()
                        == Some(scored.quote.vendor.as_str()),
                    apportionment: apportioner.apportion(
                        &self.registry,
                        amount,
                        &WeightOverrides::new(),
                    ),
                })
            })
            .collect()
    }

    pub fn simulate(&self, request: &SimulationRequest) -> Result<SimulationOutcome, SimulationError> {
        request.validate()?;

        let apportioner = self.apportioner();
        let step = request.step.unwrap_or(self.rules.apportionment.default_step);
        let apportionment =
            apportioner.apportion_with_step(&self.registry, request.amount, step, &request.overrides);

        if let Some(unit_id) = request
            .overrides
            .keys()
            .find(|unit_id| apportionment.line(**unit_id).is_none())
        {
            return Err(SimulationError::UnknownUnit(*unit_id));
        }

        let (adjusted, rejected_take_overs) =
            simulation::apply_requested_take_overs(&apportionment, &request.take_overs);

        info!(
            amount = request.amount,
            step,
            overrides = request.overrides.len(),
            take_overs = request.take_overs.len(),
            rejected = rejected_take_overs.len(),
            "simulation computed"
        );

        Ok(SimulationOutcome {
            apportionment,
            adjusted,
            rejected_take_overs,
        })
    }

    pub fn canvassing(&self, records: &[VoteRecord]) -> CanvassingPlan {
        CanvassingPlanner::new(self.rules.canvassing.clone()).plan(&self.registry, records)
    }

    pub fn constants(&self) -> DashboardConstants {
        let votes = &self.rules.votes;
        DashboardConstants {
            total_shares: votes.total_shares,
            majority: votes.majority,
            bridge: votes.bridge,
            scenario_building: votes.scenario_building.clone(),
            scenario_building_shares: self.registry.building_shares(&votes.scenario_building),
            elevator_buildings: self
                .rules
                .apportionment
                .elevator_buildings
                .iter()
                .cloned()
                .collect(),
            default_step: self.rules.apportionment.default_step,
            horizon_years: self.rules.comparison.horizon_years,
        }
    }

    pub fn snapshot(&self, records: &[VoteRecord], generated_at: DateTime<Utc>) -> DashboardSnapshot {
        let comparison = self.compare_quotes();
        let simulations = self.quote_simulations(&comparison);
        let snapshot = DashboardSnapshot {
            generated_at,
            constants: self.constants(),
            simulations,
            comparison,
            tally: tally(&self.registry, records, &self.rules.votes),
            votes: vote_detail(&self.registry, records),
            canvassing: self.canvassing(records),
        };
        debug!(
            simulations = snapshot.simulations.len(),
            votes = snapshot.votes.len(),
            "dashboard snapshot assembled"
        );
        snapshot
    }
}
