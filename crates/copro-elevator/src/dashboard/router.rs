use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use crate::error::AppError;
use crate::votes::router::run_blocking;
use crate::votes::{VoteRepository, VoteService};

use super::{Project, SimulationRequest};

pub struct DashboardState<R> {
    pub project: Arc<Project>,
    pub votes: Arc<VoteService<R>>,
}

/// Router exposing the dashboard snapshot, the quote comparison and the
/// cost simulator.
pub fn dashboard_router<R>(project: Arc<Project>, votes: Arc<VoteService<R>>) -> Router
where
    R: VoteRepository + 'static,
{
    let state = Arc::new(DashboardState { project, votes });
    Router::new()
        .route("/api/v1/dashboard", get(dashboard_handler::<R>))
        .route("/api/v1/quotes", get(quotes_handler::<R>))
        .route("/api/v1/simulation", post(simulation_handler::<R>))
        .with_state(state)
}

pub(crate) async fn dashboard_handler<R>(State(state): State<Arc<DashboardState<R>>>) -> Response
where
    R: VoteRepository + 'static,
{
    let votes = state.votes.clone();
    match run_blocking(move || votes.records()).await {
        Ok(Ok(records)) => {
            let snapshot = state.project.snapshot(&records, Utc::now());
            (StatusCode::OK, axum::Json(snapshot)).into_response()
        }
        Ok(Err(error)) => AppError::from(error).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn quotes_handler<R>(State(state): State<Arc<DashboardState<R>>>) -> Response
where
    R: VoteRepository + 'static,
{
    let comparison = state.project.compare_quotes();
    (StatusCode::OK, axum::Json(comparison)).into_response()
}

pub(crate) async fn simulation_handler<R>(
    State(state): State<Arc<DashboardState<R>>>,
    axum::Json(request): axum::Json<SimulationRequest>,
) -> Response
where
    R: VoteRepository + 'static,
{
    match state.project.simulate(&request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}
