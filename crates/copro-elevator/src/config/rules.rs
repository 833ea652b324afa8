use serde::{Deserialize, Serialize};

use crate::apportionment::ApportionmentRules;
use crate::canvassing::CanvassingRules;
use crate::quotes::ComparisonRules;
use crate::votes::VoteRules;

/// Fixed constants of the project, passed explicitly to each calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRules {
    pub comparison: ComparisonRules,
    pub apportionment: ApportionmentRules,
    pub votes: VoteRules,
    pub canvassing: CanvassingRules,
}
