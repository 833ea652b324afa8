use crate::registry::BuildingCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Parameters for splitting an elevator cost across units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApportionmentRules {
    /// Buildings served by the elevator; only their units pay.
    pub elevator_buildings: BTreeSet<BuildingCode>,
    /// Per-floor step the stored coefficients were derived from.
    pub default_step: f64,
    /// Constant added to `floor * step` on upper floors. The default `0.5`
    /// matches the stored coefficient table; `0` gives the plain
    /// `floor * step` curve.
    pub curve_offset: f64,
    /// Decimals kept on estimated elevator shares.
    pub estimate_decimals: u32,
}

impl Default for ApportionmentRules {
    fn default() -> Self {
        Self {
            elevator_buildings: BTreeSet::from([BuildingCode::new("A")]),
            default_step: 0.5,
            curve_offset: 0.5,
            estimate_decimals: 1,
        }
    }
}
