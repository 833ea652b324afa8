//! Read-only view of the co-ownership's apartment units.
//!
//! Units are reference data: they are loaded once (see `crate::import`) and
//! never mutated by the calculation modules.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

const COMPANY_PREFIXES: &[&str] = &["SCI ", "SCI\u{a0}", "SARL ", "SAS ", "EURL ", "SA "];
const COMPANY_KEYWORDS: &[&str] = &["IMMOBILIER", "CITYA", "FONCIA", "AXIUM"];

/// Lot number identifying a unit in the co-ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Building code such as `A`, `B` or `C`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingCode(pub String);

impl BuildingCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One apartment or lot of the co-ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub building: BuildingCode,
    pub floor: u8,
    pub location: String,
    /// General co-ownership share ("tantième").
    pub general_share: f64,
    /// Step function of the floor; always 0 on the ground floor.
    pub elevator_coefficient: f64,
    /// Stored elevator-specific share, `None` when it has to be estimated.
    pub elevator_share: Option<f64>,
    pub owners: Vec<String>,
    /// Whether one of the owners sits on the oversight board.
    pub board_member: bool,
}

impl Unit {
    pub fn owner_label(&self) -> String {
        self.owners.join(", ")
    }

    pub fn has_company_owner(&self) -> bool {
        self.owners.iter().any(|owner| is_company_name(owner))
    }

    pub fn is_in(&self, building: &BuildingCode) -> bool {
        &self.building == building
    }
}

/// Heuristic used by canvassing to spot companies among owners.
pub fn is_company_name(name: &str) -> bool {
    let upper = name.trim().to_uppercase();
    COMPANY_PREFIXES
        .iter()
        .any(|prefix| upper.starts_with(prefix))
        || COMPANY_KEYWORDS
            .iter()
            .any(|keyword| upper.contains(keyword))
}

/// Invariant violations detected while building a registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("unit {0} appears more than once")]
    DuplicateUnit(UnitId),
    #[error("unit {0} must have a positive general share")]
    NonPositiveShare(UnitId),
    #[error("unit {0} has a negative elevator coefficient")]
    NegativeCoefficient(UnitId),
    #[error("unit {0} is on the ground floor but has a non-zero elevator coefficient")]
    GroundFloorCoefficient(UnitId),
    #[error("unit {0} has a negative stored elevator share")]
    NegativeElevatorShare(UnitId),
}

/// Ordered collection of units, validated on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitRegistry {
    units: Vec<Unit>,
}

impl UnitRegistry {
    pub fn new(units: Vec<Unit>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for unit in &units {
            if !seen.insert(unit.id) {
                return Err(RegistryError::DuplicateUnit(unit.id));
            }
            validate_unit(unit)?;
        }
        Ok(Self { units })
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn in_building<'a>(
        &'a self,
        building: &'a BuildingCode,
    ) -> impl Iterator<Item = &'a Unit> + 'a {
        self.units.iter().filter(move |unit| unit.is_in(building))
    }

    /// Units belonging to any of the given buildings, in registry order.
    pub fn in_buildings(&self, buildings: &BTreeSet<BuildingCode>) -> Vec<&Unit> {
        self.units
            .iter()
            .filter(|unit| buildings.contains(&unit.building))
            .collect()
    }

    pub fn buildings(&self) -> BTreeSet<BuildingCode> {
        self.units.iter().map(|unit| unit.building.clone()).collect()
    }

    pub fn total_shares(&self) -> f64 {
        self.units.iter().map(|unit| unit.general_share).sum()
    }

    pub fn building_shares(&self, building: &BuildingCode) -> f64 {
        self.in_building(building)
            .map(|unit| unit.general_share)
            .sum()
    }
}

/// Checks the per-unit invariants; uniqueness is checked by the registry.
pub fn validate_unit(unit: &Unit) -> Result<(), RegistryError> {
    if unit.general_share <= 0.0 || !unit.general_share.is_finite() {
        return Err(RegistryError::NonPositiveShare(unit.id));
    }
    if unit.elevator_coefficient < 0.0 {
        return Err(RegistryError::NegativeCoefficient(unit.id));
    }
    if unit.floor == 0 && unit.elevator_coefficient != 0.0 {
        return Err(RegistryError::GroundFloorCoefficient(unit.id));
    }
    if matches!(unit.elevator_share, Some(share) if share < 0.0) {
        return Err(RegistryError::NegativeElevatorShare(unit.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: u32, building: &str, floor: u8, share: f64, coefficient: f64) -> Unit {
        Unit {
            id: UnitId(id),
            building: BuildingCode::new(building),
            floor,
            location: "Left".to_string(),
            general_share: share,
            elevator_coefficient: coefficient,
            elevator_share: Some(share * coefficient / 10.0),
            owners: vec![format!("Owner {id}")],
            board_member: false,
        }
    }

    #[test]
    fn registry_rejects_duplicate_ids() {
        let error = UnitRegistry::new(vec![unit(1, "A", 1, 100.0, 1.0), unit(1, "B", 0, 50.0, 0.0)])
            .expect_err("duplicate must fail");
        assert_eq!(error, RegistryError::DuplicateUnit(UnitId(1)));
    }

    #[test]
    fn registry_rejects_ground_floor_coefficient() {
        let error = UnitRegistry::new(vec![unit(2, "A", 0, 100.0, 1.0)])
            .expect_err("ground floor coefficient must fail");
        assert_eq!(error, RegistryError::GroundFloorCoefficient(UnitId(2)));
    }

    #[test]
    fn building_shares_only_count_that_building() {
        let registry = UnitRegistry::new(vec![
            unit(1, "A", 1, 100.0, 1.0),
            unit(2, "a", 2, 250.0, 1.5),
            unit(3, "B", 0, 75.0, 0.0),
        ])
        .expect("valid registry");

        assert_eq!(registry.building_shares(&BuildingCode::new("A")), 350.0);
        assert_eq!(registry.total_shares(), 425.0);
        assert_eq!(registry.buildings().len(), 2);
    }

    #[test]
    fn company_names_are_detected() {
        assert!(is_company_name("SCI Les Tilleuls"));
        assert!(is_company_name("Cabinet Foncia Montmartre"));
        assert!(!is_company_name("Sarah Martin"));
    }
}
