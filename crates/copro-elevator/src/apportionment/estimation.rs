use crate::registry::{Unit, UnitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied elevator weights replacing stored ones.
pub type WeightOverrides = BTreeMap<UnitId, f64>;

/// Where a unit's elevator weight came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightOrigin {
    Stored,
    Estimated,
    Override,
    /// No stored weight and nothing to estimate from.
    Missing,
}

impl WeightOrigin {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Estimated => "estimated",
            Self::Override => "override",
            Self::Missing => "missing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWeight {
    pub value: f64,
    pub origin: WeightOrigin,
}

impl ResolvedWeight {
    pub fn is_estimated(&self) -> bool {
        self.origin == WeightOrigin::Estimated
    }
}

/// Strategy estimating the elevator weight of a unit without a stored one.
pub trait WeightEstimator {
    /// `units` is the full apportionment scope, `unit` included.
    fn estimate(&self, unit: &Unit, units: &[&Unit]) -> Option<f64>;
}

/// Averages `elevator_share / general_share` over same-building, same-floor
/// peers that have a stored weight, then applies it to the unit's share.
#[derive(Debug, Clone, Copy)]
pub struct FloorRatioEstimator {
    pub decimals: u32,
}

impl WeightEstimator for FloorRatioEstimator {
    fn estimate(&self, unit: &Unit, units: &[&Unit]) -> Option<f64> {
        let ratios: Vec<f64> = units
            .iter()
            .filter(|peer| {
                peer.id != unit.id && peer.building == unit.building && peer.floor == unit.floor
            })
            .filter_map(|peer| match peer.elevator_share {
                Some(share) if share > 0.0 && peer.general_share > 0.0 => {
                    Some(share / peer.general_share)
                }
                _ => None,
            })
            .collect();

        if ratios.is_empty() {
            return None;
        }

        let average = ratios.iter().sum::<f64>() / ratios.len() as f64;
        Some(round_to(unit.general_share * average, self.decimals))
    }
}

/// Resolves one weight per unit: override, stored, estimated, or zero.
/// A zero coefficient always resolves to a zero weight.
pub fn resolve_weights(
    units: &[&Unit],
    overrides: &WeightOverrides,
    estimator: &dyn WeightEstimator,
) -> Vec<ResolvedWeight> {
    units
        .iter()
        .map(|unit| resolve_weight(unit, units, overrides, estimator))
        .collect()
}

fn resolve_weight(
    unit: &Unit,
    units: &[&Unit],
    overrides: &WeightOverrides,
    estimator: &dyn WeightEstimator,
) -> ResolvedWeight {
    if unit.elevator_coefficient == 0.0 {
        return ResolvedWeight {
            value: 0.0,
            origin: WeightOrigin::Stored,
        };
    }

    if let Some(value) = overrides.get(&unit.id) {
        return ResolvedWeight {
            value: value.max(0.0),
            origin: WeightOrigin::Override,
        };
    }

    if let Some(value) = unit.elevator_share {
        return ResolvedWeight {
            value,
            origin: WeightOrigin::Stored,
        };
    }

    match estimator.estimate(unit, units) {
        Some(value) if value > 0.0 => ResolvedWeight {
            value,
            origin: WeightOrigin::Estimated,
        },
        _ => ResolvedWeight {
            value: 0.0,
            origin: WeightOrigin::Missing,
        },
    }
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}
