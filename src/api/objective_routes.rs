//! Objective REST endpoints
//!
//! ## Endpoints
//!
//! - `POST /objectives` - create an objective (auth required)
//! - `GET /objectives` - list all objectives
//! - `GET /objectives/:iid` - fetch one objective
//! - `PUT /objectives/:iid` - partial update (auth required)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use tracing::warn;

use crate::api::auth::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::{status_for, ApiResponse};
use crate::models::{ObjectiveCreateRequest, ObjectiveResponse, ObjectiveUpdateRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_objectives).post(create_objective))
        .route("/:iid", get(get_objective).put(update_objective))
}

async fn create_objective(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<ObjectiveCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ObjectiveResponse>>), StatusCode> {
    match state.objectives.create(payload).await {
        Ok(objective) => Ok((StatusCode::CREATED, Json(ApiResponse::ok(objective)))),
        Err(e) => {
            warn!("Failed to create objective: {e}");
            Err(status_for(&e))
        }
    }
}

async fn list_objectives(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ObjectiveResponse>>>, StatusCode> {
    match state.objectives.list().await {
        Ok(objectives) => Ok(Json(ApiResponse::ok(objectives))),
        Err(e) => {
            warn!("Failed to list objectives: {e}");
            Err(status_for(&e))
        }
    }
}

async fn get_objective(
    Path(iid): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ObjectiveResponse>>, StatusCode> {
    match state.objectives.get(iid).await {
        Ok(objective) => Ok(Json(ApiResponse::ok(objective))),
        Err(e) => {
            warn!("Failed to retrieve objective {iid}: {e}");
            Err(status_for(&e))
        }
    }
}

async fn update_objective(
    Path(iid): Path<u64>,
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<ObjectiveUpdateRequest>,
) -> Result<Json<ApiResponse<ObjectiveResponse>>, StatusCode> {
    match state.objectives.update(iid, payload).await {
        Ok(objective) => Ok(Json(ApiResponse::ok(objective))),
        Err(e) => {
            warn!("Failed to update objective {iid}: {e}");
            Err(status_for(&e))
        }
    }
}
