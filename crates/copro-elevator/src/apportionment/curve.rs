use serde::{Deserialize, Serialize};

/// Elevator coefficient as a function of the floor number.
///
/// `coefficient(floor) = offset + floor * step` for upper floors and `0` on
/// the ground floor whatever the step. With `offset = 0` this is the plain
/// `floor * step` curve.
///
/// The default rules use `offset = 0.5` so that the default step of `0.5`
/// reproduces the stored coefficient table (`1.0` on the first floor, `1.5`
/// on the second). Every step simulated under those rules therefore yields
/// `0.5 + floor * step` on upper floors, not `floor * step`. Set
/// `ApportionmentRules::curve_offset` to `0` for the plain curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorCoefficientCurve {
    pub step: f64,
    pub offset: f64,
}

impl FloorCoefficientCurve {
    pub fn new(step: f64, offset: f64) -> Self {
        Self { step, offset }
    }

    pub fn coefficient(&self, floor: u8) -> f64 {
        if floor == 0 {
            return 0.0;
        }
        (self.offset + f64::from(floor) * self.step).max(0.0)
    }

    /// Rescales a weight computed under `reference` to this curve.
    pub fn rescale(&self, weight: f64, floor: u8, reference: &FloorCoefficientCurve) -> f64 {
        let reference_coefficient = reference.coefficient(floor);
        if reference_coefficient <= 0.0 {
            return 0.0;
        }
        weight * self.coefficient(floor) / reference_coefficient
    }
}
