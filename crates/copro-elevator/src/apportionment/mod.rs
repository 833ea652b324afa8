//! Splits a candidate elevator cost across units by elevator weight.
//!
//! Weights come from the registry, optionally overridden per unit, with
//! missing ones estimated from same-floor peers. A floor step other than
//! the default rescales every weight along the floor coefficient curve.
//! Take-over plans then move money between units on top of the base split.

mod config;
mod curve;
mod estimation;
mod takeover;

pub use config::ApportionmentRules;
pub use curve::FloorCoefficientCurve;
pub use estimation::{
    resolve_weights, FloorRatioEstimator, ResolvedWeight, WeightEstimator, WeightOrigin,
    WeightOverrides,
};
pub use takeover::{TakeOver, TakeOverPlan, TakeOverRejection};

pub(crate) use estimation::round_to;

use crate::registry::{BuildingCode, Unit, UnitId, UnitRegistry};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Quote-part of one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotePartLine {
    pub unit_id: UnitId,
    pub building: BuildingCode,
    pub floor: u8,
    pub location: String,
    pub owners: Vec<String>,
    pub general_share: f64,
    /// Stored coefficient at the default step, otherwise
    /// `offset + floor * step` above the ground floor.
    pub coefficient: f64,
    pub weight: ResolvedWeight,
    pub quote_part: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Apportionment {
    pub amount: f64,
    pub step: f64,
    /// Curve offset the coefficients were computed with.
    pub offset: f64,
    pub total_weight: f64,
    pub lines: Vec<QuotePartLine>,
}

impl Apportionment {
    pub fn line(&self, unit_id: UnitId) -> Option<&QuotePartLine> {
        self.lines.iter().find(|line| line.unit_id == unit_id)
    }

    pub fn total_quote_parts(&self) -> f64 {
        self.lines.iter().map(|line| line.quote_part).sum()
    }

    pub fn estimated_units(&self) -> impl Iterator<Item = &QuotePartLine> {
        self.lines.iter().filter(|line| line.weight.is_estimated())
    }

    /// Applies a take-over plan on top of the base quote-parts.
    ///
    /// Each transfer moves `beneficiary base × percent / 100` from the
    /// beneficiary to the payer, so the adjustments always sum to zero.
    pub fn apply_take_overs(
        &self,
        plan: &TakeOverPlan,
    ) -> Result<AdjustedApportionment, TakeOverRejection> {
        let mut deltas: BTreeMap<UnitId, f64> = BTreeMap::new();

        for take_over in plan.take_overs() {
            let beneficiary = self
                .line(take_over.beneficiary)
                .ok_or(TakeOverRejection::UnknownUnit(take_over.beneficiary))?;
            if self.line(take_over.payer).is_none() {
                return Err(TakeOverRejection::UnknownUnit(take_over.payer));
            }

            let transferred =
                round_to(beneficiary.quote_part * f64::from(take_over.percent) / 100.0, 2);
            *deltas.entry(take_over.beneficiary).or_default() -= transferred;
            *deltas.entry(take_over.payer).or_default() += transferred;
        }

        let lines = self
            .lines
            .iter()
            .map(|line| {
                let delta = deltas.get(&line.unit_id).copied().unwrap_or_default();
                AdjustedLine {
                    unit_id: line.unit_id,
                    base: line.quote_part,
                    delta,
                    adjusted: round_to(line.quote_part + delta, 2),
                }
            })
            .collect();

        Ok(AdjustedApportionment {
            take_overs: plan.take_overs().to_vec(),
            lines,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedLine {
    pub unit_id: UnitId,
    pub base: f64,
    /// Signed: negative for beneficiaries, positive for payers.
    pub delta: f64,
    pub adjusted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedApportionment {
    pub take_overs: Vec<TakeOver>,
    pub lines: Vec<AdjustedLine>,
}

impl AdjustedApportionment {
    pub fn line(&self, unit_id: UnitId) -> Option<&AdjustedLine> {
        self.lines.iter().find(|line| line.unit_id == unit_id)
    }

    pub fn net_delta(&self) -> f64 {
        self.lines.iter().map(|line| line.delta).sum()
    }
}

pub struct Apportioner {
    rules: ApportionmentRules,
    estimator: FloorRatioEstimator,
}

impl Apportioner {
    pub fn new(rules: ApportionmentRules) -> Self {
        let estimator = FloorRatioEstimator {
            decimals: rules.estimate_decimals,
        };
        Self { rules, estimator }
    }

    pub fn rules(&self) -> &ApportionmentRules {
        &self.rules
    }

    pub fn default_curve(&self) -> FloorCoefficientCurve {
        FloorCoefficientCurve::new(self.rules.default_step, self.rules.curve_offset)
    }

    /// Splits `amount` over the elevator buildings with the stored weights.
    pub fn apportion(
        &self,
        registry: &UnitRegistry,
        amount: f64,
        overrides: &WeightOverrides,
    ) -> Apportionment {
        self.apportion_with_step(registry, amount, self.rules.default_step, overrides)
    }

    pub fn apportion_with_step(
        &self,
        registry: &UnitRegistry,
        amount: f64,
        step: f64,
        overrides: &WeightOverrides,
    ) -> Apportionment {
        let mut scope = registry.in_buildings(&self.rules.elevator_buildings);
        scope.sort_by(|left, right| {
            left.floor
                .cmp(&right.floor)
                .then_with(|| left.location.cmp(&right.location))
                .then_with(|| left.id.cmp(&right.id))
        });
        self.apportion_units(&scope, amount, step, overrides)
    }

    /// Splits `amount` over an explicit unit set, in the given order.
    pub fn apportion_units(
        &self,
        units: &[&Unit],
        amount: f64,
        step: f64,
        overrides: &WeightOverrides,
    ) -> Apportionment {
        let reference = self.default_curve();
        let curve = FloorCoefficientCurve::new(step, self.rules.curve_offset);
        let rescaled = step != self.rules.default_step;

        let weights: Vec<ResolvedWeight> = resolve_weights(units, overrides, &self.estimator)
            .into_iter()
            .zip(units)
            .map(|(weight, unit)| {
                if rescaled {
                    ResolvedWeight {
                        value: curve.rescale(weight.value, unit.floor, &reference),
                        origin: weight.origin,
                    }
                } else {
                    weight
                }
            })
            .collect();

        let total_weight: f64 = weights.iter().map(|weight| weight.value).sum();

        let quote_parts = split_in_cents(amount, &weights, total_weight);

        let lines: Vec<QuotePartLine> = units
            .iter()
            .zip(weights)
            .zip(quote_parts)
            .map(|((unit, weight), quote_part)| QuotePartLine {
                unit_id: unit.id,
                building: unit.building.clone(),
                floor: unit.floor,
                location: unit.location.clone(),
                owners: unit.owners.clone(),
                general_share: unit.general_share,
                coefficient: if rescaled {
                    curve.coefficient(unit.floor)
                } else {
                    unit.elevator_coefficient
                },
                weight,
                quote_part,
            })
            .collect();

        debug!(
            amount,
            step,
            units = lines.len(),
            total_weight,
            "apportionment computed"
        );

        Apportionment {
            amount,
            step,
            offset: curve.offset,
            total_weight,
            lines,
        }
    }
}

/// Proportional split rounded to cents, largest remainder first, so the
/// parts always add up to `amount` rounded to cents.
fn split_in_cents(amount: f64, weights: &[ResolvedWeight], total_weight: f64) -> Vec<f64> {
    if total_weight <= 0.0 {
        return vec![0.0; weights.len()];
    }

    let target_cents = (amount * 100.0).round() as i64;
    let mut cents = Vec::with_capacity(weights.len());
    let mut remainders = Vec::new();
    for (index, weight) in weights.iter().enumerate() {
        if weight.value <= 0.0 {
            cents.push(0_i64);
            continue;
        }
        let exact = target_cents as f64 * weight.value / total_weight;
        let floored = exact.floor();
        cents.push(floored as i64);
        remainders.push((index, exact - floored));
    }

    remainders.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let leftover = target_cents - cents.iter().sum::<i64>();
    for (index, _) in remainders.iter().take(leftover.max(0) as usize) {
        cents[*index] += 1;
    }

    cents.into_iter().map(|cents| cents as f64 / 100.0).collect()
}
