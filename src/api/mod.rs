//! REST API module
//!
//! Thin axum pass-throughs to the entity services. All routers share one
//! `AppState`; mutating routes require a bearer token.

pub mod activity_routes;
pub mod auth;
pub mod kr_routes;
pub mod objective_routes;
pub mod state;

use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::OkrError;
pub use state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// HTTP status for a service error: missing primary entity → 404, bad
/// input → 400, ticket store trouble → 502.
pub fn status_for(error: &OkrError) -> StatusCode {
    match error {
        OkrError::NotFound(_) => StatusCode::NOT_FOUND,
        OkrError::Validation(_) => StatusCode::BAD_REQUEST,
        OkrError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/token", post(auth::login))
        .nest("/objectives", objective_routes::router())
        .nest("/krs", kr_routes::router())
        .nest("/activities", activity_routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::ok("OK".to_string()))
}
