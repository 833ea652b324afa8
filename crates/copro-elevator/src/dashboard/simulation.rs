use serde::{Deserialize, Serialize};

use crate::apportionment::{
    AdjustedApportionment, Apportionment, TakeOver, TakeOverPlan, TakeOverRejection,
    WeightOverrides,
};
use crate::registry::UnitId;

/// What-if request: a target cost plus optional weighting changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub amount: f64,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(default)]
    pub overrides: WeightOverrides,
    #[serde(default)]
    pub take_overs: Vec<TakeOver>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedTakeOver {
    #[serde(flatten)]
    pub take_over: TakeOver,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub apportionment: Apportionment,
    /// Present when at least one take-over was accepted.
    pub adjusted: Option<AdjustedApportionment>,
    pub rejected_take_overs: Vec<RejectedTakeOver>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),
    #[error("floor step must be a non-negative number, got {0}")]
    InvalidStep(f64),
    #[error("weight override for unit {0} must be a non-negative number")]
    InvalidOverride(UnitId),
    #[error("unit {0} is not part of the apportionment")]
    UnknownUnit(UnitId),
}

impl SimulationRequest {
    pub(crate) fn validate(&self) -> Result<(), SimulationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(SimulationError::InvalidAmount(self.amount));
        }
        if let Some(step) = self.step {
            if !step.is_finite() || step < 0.0 {
                return Err(SimulationError::InvalidStep(step));
            }
        }
        if let Some((unit_id, _)) = self
            .overrides
            .iter()
            .find(|(_, weight)| !weight.is_finite() || **weight < 0.0)
        {
            return Err(SimulationError::InvalidOverride(*unit_id));
        }
        Ok(())
    }
}

/// Builds the take-over plan against an apportionment, collecting every
/// rejected request instead of failing the whole simulation.
pub(crate) fn apply_requested_take_overs(
    apportionment: &Apportionment,
    requests: &[TakeOver],
) -> (Option<AdjustedApportionment>, Vec<RejectedTakeOver>) {
    let mut rejected = Vec::new();
    let mut plan = TakeOverPlan::new();

    for request in requests {
        let unknown = [request.payer, request.beneficiary]
            .into_iter()
            .find(|unit_id| apportionment.line(*unit_id).is_none());
        let result = match unknown {
            Some(unit_id) => Err(TakeOverRejection::UnknownUnit(unit_id)),
            None => plan.add(*request),
        };
        if let Err(reason) = result {
            rejected.push(RejectedTakeOver {
                take_over: *request,
                reason: reason.to_string(),
            });
        }
    }

    if plan.is_empty() {
        return (None, rejected);
    }

    match apportionment.apply_take_overs(&plan) {
        Ok(adjusted) => (Some(adjusted), rejected),
        Err(reason) => {
            rejected.extend(plan.take_overs().iter().map(|take_over| RejectedTakeOver {
                take_over: *take_over,
                reason: reason.to_string(),
            }));
            (None, rejected)
        }
    }
}
