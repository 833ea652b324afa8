use serde::{Deserialize, Serialize};

use crate::registry::BuildingCode;

/// Statutory thresholds and projection parameters for the vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRules {
    /// Total general shares of the co-ownership.
    pub total_shares: f64,
    /// Simple majority over the whole co-ownership.
    pub majority: f64,
    /// One-third threshold allowing an immediate second vote.
    pub bridge: f64,
    /// Building whose shares form the alternative scenario, also the
    /// building served by the elevator for seeding purposes.
    pub scenario_building: BuildingCode,
    /// Share of undecided votes assumed to convert in the realistic projection.
    pub realistic_rate: f64,
    /// Floor from which seeding treats an owner as a major beneficiary.
    pub major_beneficiary_floor: u8,
    /// Floor from which seeding assumes daily comfort wins the vote.
    pub comfort_floor: u8,
}

impl Default for VoteRules {
    fn default() -> Self {
        Self {
            total_shares: 14_836.0,
            majority: 7_419.0,
            bridge: 4_946.0,
            scenario_building: BuildingCode::new("A"),
            realistic_rate: 0.30,
            major_beneficiary_floor: 5,
            comfort_floor: 3,
        }
    }
}
