//! Key Result REST endpoints
//!
//! ## Endpoints
//!
//! - `POST /krs` - create a KR under an objective (auth required)
//! - `GET /krs` - list all KRs
//! - `GET /krs/:iid` - fetch one KR
//! - `PUT /krs/:iid` - partial field update (auth required)
//! - `PUT /krs/:iid/description` - raw description replace (auth required)
//! - `GET /krs/objective/:objective_iid` - list the KRs of one objective;
//!   `?resolution=scan` resolves from the KR side instead of the
//!   objective's link list

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, put};
use axum::Router;
use tracing::warn;

use crate::api::auth::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::{status_for, ApiResponse};
use crate::models::{
    KrCreateRequest, KrDescriptionUpdateRequest, KrResponse, KrUpdateRequest,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_krs).post(create_kr))
        .route("/:iid", get(get_kr).put(update_kr))
        .route("/:iid/description", put(replace_kr_description))
        .route("/objective/:objective_iid", get(list_krs_for_objective))
}

async fn create_kr(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<KrCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<KrResponse>>), StatusCode> {
    match state.krs.create(payload).await {
        Ok(kr) => Ok((StatusCode::CREATED, Json(ApiResponse::ok(kr)))),
        Err(e) => {
            warn!("Failed to create KR: {e}");
            Err(status_for(&e))
        }
    }
}

async fn get_kr(
    Path(iid): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<KrResponse>>, StatusCode> {
    match state.krs.get(iid).await {
        Ok(kr) => Ok(Json(ApiResponse::ok(kr))),
        Err(e) => {
            warn!("Failed to retrieve KR {iid}: {e}");
            Err(status_for(&e))
        }
    }
}

async fn update_kr(
    Path(iid): Path<u64>,
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<KrUpdateRequest>,
) -> Result<Json<ApiResponse<KrResponse>>, StatusCode> {
    match state.krs.update(iid, payload).await {
        Ok(kr) => Ok(Json(ApiResponse::ok(kr))),
        Err(e) => {
            warn!("Failed to update KR {iid}: {e}");
            Err(status_for(&e))
        }
    }
}

async fn replace_kr_description(
    Path(iid): Path<u64>,
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<KrDescriptionUpdateRequest>,
) -> Result<Json<ApiResponse<KrResponse>>, StatusCode> {
    match state.krs.replace_description(iid, payload.description).await {
        Ok(kr) => Ok(Json(ApiResponse::ok(kr))),
        Err(e) => {
            warn!("Failed to replace description of KR {iid}: {e}");
            Err(status_for(&e))
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ResolutionQuery {
    resolution: Option<String>,
}

async fn list_krs_for_objective(
    Path(objective_iid): Path<u64>,
    Query(query): Query<ResolutionQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<KrResponse>>>, StatusCode> {
    let result = match query.resolution.as_deref() {
        Some("scan") => state.krs.list_for_objective_by_scan(objective_iid).await,
        _ => state.krs.list_for_objective(objective_iid).await,
    };
    match result {
        Ok(krs) => Ok(Json(ApiResponse::ok(krs))),
        Err(e) => {
            warn!("Failed to list KRs for objective {objective_iid}: {e}");
            Err(status_for(&e))
        }
    }
}

async fn list_all_krs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<KrResponse>>>, StatusCode> {
    match state.krs.list_all().await {
        Ok(krs) => Ok(Json(ApiResponse::ok(krs))),
        Err(e) => {
            warn!("Failed to list all KRs: {e}");
            Err(status_for(&e))
        }
    }
}
