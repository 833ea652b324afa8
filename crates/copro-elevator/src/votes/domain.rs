use serde::{Deserialize, Serialize};

use crate::registry::{BuildingCode, UnitId};

/// Voting intention recorded for a unit ahead of the general assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Favorable,
    Opposed,
    Abstaining,
    Absent,
    Unknown,
}

impl VoteChoice {
    pub const ALL: [VoteChoice; 5] = [
        Self::Favorable,
        Self::Opposed,
        Self::Abstaining,
        Self::Absent,
        Self::Unknown,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Favorable => "favorable",
            Self::Opposed => "opposed",
            Self::Abstaining => "abstaining",
            Self::Absent => "absent",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|choice| choice.label().eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Certain,
    Probable,
    Possible,
    Unknown,
}

impl Confidence {
    pub const ALL: [Confidence; 4] = [
        Self::Certain,
        Self::Probable,
        Self::Possible,
        Self::Unknown,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Certain => "certain",
            Self::Probable => "probable",
            Self::Possible => "possible",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|confidence| confidence.label().eq_ignore_ascii_case(label))
    }
}

/// Persisted vote state of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub unit_id: UnitId,
    pub choice: VoteChoice,
    pub confidence: Confidence,
    pub contact_made: bool,
    /// Talking point used when canvassing the owner.
    pub key_argument: String,
}

/// Result of a single-record mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    Applied,
    UnitNotFound,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Vote record joined with the unit it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteDetail {
    pub unit_id: UnitId,
    pub building: BuildingCode,
    pub floor: u8,
    pub location: String,
    pub general_share: f64,
    pub elevator_coefficient: f64,
    pub elevator_share: Option<f64>,
    pub owners: Vec<String>,
    pub board_member: bool,
    pub choice: VoteChoice,
    pub confidence: Confidence,
    pub contact_made: bool,
    pub key_argument: String,
}
