//! Decision support for a co-ownership elevator project: vendor quote
//! comparison, cost apportionment by elevator weight, and the vote tally
//! ahead of the general assembly.

pub mod apportionment;
pub mod canvassing;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod import;
pub mod quotes;
pub mod registry;
pub mod telemetry;
pub mod votes;

pub use apportionment::{
    AdjustedApportionment, Apportioner, Apportionment, ApportionmentRules, QuotePartLine,
    TakeOver, TakeOverPlan, TakeOverRejection, WeightOverrides,
};
pub use canvassing::{CanvassingPlan, CanvassingPlanner, CanvassingRules};
pub use config::{AppConfig, ProjectRules};
pub use dashboard::{
    dashboard_router, DashboardSnapshot, Project, SimulationError, SimulationOutcome,
    SimulationRequest,
};
pub use error::AppError;
pub use import::{ImportError, ReferenceData, ReferenceImporter};
pub use quotes::{ComparisonRules, Quote, QuoteComparator, QuoteComparison};
pub use registry::{BuildingCode, Unit, UnitId, UnitRegistry};
pub use votes::{
    vote_router, SqliteVoteRepository, TallyReport, VoteChoice, VoteRepository, VoteRules,
    VoteService,
};
