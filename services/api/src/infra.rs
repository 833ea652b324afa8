use copro_elevator::config::DataConfig;
use copro_elevator::error::AppError;
use copro_elevator::{
    Project, ProjectRules, ReferenceImporter, SqliteVoteRepository, TakeOver, UnitId, VoteService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Votes = VoteService<SqliteVoteRepository>;

/// Reference data and the vote store, shared by the server and the CLI.
pub(crate) struct ProjectState {
    pub(crate) project: Arc<Project>,
    pub(crate) votes: Arc<Votes>,
}

/// Loads the CSV reference data, opens the vote store and seeds it when
/// empty.
pub(crate) fn load_state(data: &DataConfig, rules: ProjectRules) -> Result<ProjectState, AppError> {
    let reference = ReferenceImporter::load_dir(&data.data_dir)?;
    let registry = Arc::new(reference.registry);
    let repository = Arc::new(SqliteVoteRepository::open(&data.database_path)?);

    let votes = Arc::new(VoteService::new(
        repository,
        registry.clone(),
        rules.votes.clone(),
    ));
    let seeded = votes.initialize()?;
    info!(
        seeded,
        database = %data.database_path.display(),
        "vote store ready"
    );

    let project = Arc::new(Project::new(registry, reference.quotes, rules));
    Ok(ProjectState { project, votes })
}

/// Parses `payer:beneficiary:percent`, e.g. `14:3:40`.
pub(crate) fn parse_take_over(raw: &str) -> Result<TakeOver, String> {
    let parts: Vec<&str> = raw.trim().split(':').map(str::trim).collect();
    let [payer, beneficiary, percent] = parts.as_slice() else {
        return Err(format!(
            "expected payer:beneficiary:percent, got '{raw}'"
        ));
    };

    let unit = |value: &str| {
        value
            .trim_start_matches('#')
            .parse::<u32>()
            .map(UnitId)
            .map_err(|err| format!("invalid unit '{value}' ({err})"))
    };
    let percent = percent
        .trim_end_matches('%')
        .parse::<u8>()
        .map_err(|err| format!("invalid percent '{percent}' ({err})"))?;

    Ok(TakeOver {
        payer: unit(payer)?,
        beneficiary: unit(beneficiary)?,
        percent,
    })
}
