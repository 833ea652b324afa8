use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::registry::UnitId;

use super::domain::MutationOutcome;
use super::repository::VoteRepository;
use super::service::{VoteService, VoteServiceError};

#[derive(Debug, Default, Deserialize)]
pub struct VoteUpdateRequest {
    pub vote: Option<String>,
    pub confidence: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactUpdateRequest {
    /// A body without the flag clears it.
    #[serde(default)]
    pub contact_made: bool,
}

/// Router exposing vote listing, mutation and reset endpoints.
pub fn vote_router<R>(service: Arc<VoteService<R>>) -> Router
where
    R: VoteRepository + 'static,
{
    Router::new()
        .route("/api/v1/votes", get(list_handler::<R>))
        .route("/api/v1/votes/reset", post(reset_handler::<R>))
        .route("/api/v1/votes/:unit_id", post(update_vote_handler::<R>))
        .route("/api/v1/contact/:unit_id", post(update_contact_handler::<R>))
        .with_state(service)
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<VoteService<R>>>) -> Response
where
    R: VoteRepository + 'static,
{
    match run_blocking(move || service.overview()).await {
        Ok(Ok(overview)) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(response) => response,
    }
}

pub(crate) async fn update_vote_handler<R>(
    State(service): State<Arc<VoteService<R>>>,
    Path(unit_id): Path<u32>,
    axum::Json(request): axum::Json<VoteUpdateRequest>,
) -> Response
where
    R: VoteRepository + 'static,
{
    let unit_id = UnitId(unit_id);
    let result = run_blocking(move || {
        service.update_vote(
            unit_id,
            request.vote.as_deref(),
            request.confidence.as_deref(),
        )
    })
    .await;
    match result {
        Ok(result) => mutation_response(unit_id, result),
        Err(response) => response,
    }
}

pub(crate) async fn update_contact_handler<R>(
    State(service): State<Arc<VoteService<R>>>,
    Path(unit_id): Path<u32>,
    axum::Json(request): axum::Json<ContactUpdateRequest>,
) -> Response
where
    R: VoteRepository + 'static,
{
    let unit_id = UnitId(unit_id);
    let result =
        run_blocking(move || service.update_contact(unit_id, request.contact_made)).await;
    match result {
        Ok(result) => mutation_response(unit_id, result),
        Err(response) => response,
    }
}

pub(crate) async fn reset_handler<R>(State(service): State<Arc<VoteService<R>>>) -> Response
where
    R: VoteRepository + 'static,
{
    match run_blocking(move || service.reset()).await {
        Ok(Ok(records)) => {
            let payload = json!({
                "success": true,
                "records": records,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(Err(error)) => error_response(error),
        Err(response) => response,
    }
}

/// Runs a store call on the blocking pool; SQLite may wait on its busy
/// timeout and must not hold an async worker meanwhile.
pub(crate) async fn run_blocking<T, F>(call: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call).await.map_err(|join_error| {
        error!(error = %join_error, "blocking store call failed");
        let payload = json!({
            "error": "vote store call did not complete",
        });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
    })
}

fn mutation_response(
    unit_id: UnitId,
    result: Result<MutationOutcome, VoteServiceError>,
) -> Response {
    match result {
        Ok(MutationOutcome::Applied) => {
            let payload = json!({
                "success": true,
                "unit_id": unit_id,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(MutationOutcome::UnitNotFound) => {
            let payload = json!({
                "error": format!("no vote record for unit {unit_id}"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: VoteServiceError) -> Response {
    let status = match error {
        VoteServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        VoteServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
