//! Activity REST endpoints
//!
//! ## Endpoints
//!
//! - `POST /activities/kr/:kr_iid` - append activities to a KR (auth
//!   required); `?strategy=merge` selects table-merging append
//! - `GET /activities/kr/:kr_iid` - list the activities of a KR

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::warn;

use crate::api::auth::AuthenticatedUser;
use crate::api::state::AppState;
use crate::api::{status_for, ApiResponse};
use crate::models::{Activity, ActivityCreateRequest, DescriptionResponse};
use crate::okr::activity_table::AppendStrategy;

pub fn router() -> Router<AppState> {
    Router::new().route("/kr/:kr_iid", get(list_activities).post(append_activities))
}

#[derive(Debug, Deserialize)]
struct AppendQuery {
    strategy: Option<String>,
}

impl AppendQuery {
    fn strategy(&self) -> AppendStrategy {
        match self.strategy.as_deref() {
            Some("merge") => AppendStrategy::MergeIntoTable,
            _ => AppendStrategy::BlindAppend,
        }
    }
}

async fn append_activities(
    Path(kr_iid): Path<u64>,
    Query(query): Query<AppendQuery>,
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<ActivityCreateRequest>,
) -> Result<Json<ApiResponse<DescriptionResponse>>, StatusCode> {
    match state
        .activities
        .append(kr_iid, &payload.activities, query.strategy())
        .await
    {
        Ok(description) => Ok(Json(ApiResponse::ok(DescriptionResponse { description }))),
        Err(e) => {
            warn!("Failed to add activities to KR {kr_iid}: {e}");
            Err(status_for(&e))
        }
    }
}

async fn list_activities(
    Path(kr_iid): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Activity>>>, StatusCode> {
    match state.activities.list(kr_iid).await {
        Ok(activities) => Ok(Json(ApiResponse::ok(activities))),
        Err(e) => {
            warn!("Failed to retrieve activities for KR {kr_iid}: {e}");
            Err(status_for(&e))
        }
    }
}
