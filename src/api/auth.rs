//! Bearer-token authentication
//!
//! `POST /auth/token` exchanges the configured credentials for an expiring
//! bearer token; the `AuthenticatedUser` extractor enforces it on mutating
//! routes. Tokens are a base64 payload (`username:expiry`) plus a SHA-256
//! signature over the configured secret, enough for a single-audience
//! service fronting an issue tracker.

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::Json;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::api::state::AppState;
use crate::config::Settings;

#[derive(Debug, Serialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Mint a signed token for `username` using the configured secret.
pub fn issue_token(settings: &Settings, username: &str) -> String {
    let expires_at =
        Utc::now() + Duration::minutes(settings.auth_token_expire_minutes);
    let payload = format!("{}:{}", username, expires_at.timestamp());
    let signature = sign(&settings.auth_secret, &payload);
    format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), signature)
}

/// Validate a token and return its username, or `None` for anything
/// malformed, tampered with or expired.
pub fn verify_token(settings: &Settings, token: &str) -> Option<String> {
    let (encoded_payload, signature) = token.split_once('.')?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(encoded_payload).ok()?;
    let payload = String::from_utf8(payload_bytes).ok()?;

    if sign(&settings.auth_secret, &payload) != signature {
        return None;
    }

    let (username, expiry) = payload.rsplit_once(':')?;
    let expiry: i64 = expiry.parse().ok()?;
    if Utc::now().timestamp() >= expiry {
        return None;
    }
    Some(username.to_string())
}

fn sign(secret: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// POST /auth/token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<Token>, StatusCode> {
    let settings = &state.settings;
    if settings.auth_username.is_empty() || settings.auth_secret.is_empty() {
        tracing::warn!("Token requested but auth is not configured");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    if request.username != settings.auth_username || request.password != settings.auth_password {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Json(Token {
        access_token: issue_token(settings, &request.username),
        token_type: "bearer".to_string(),
    }))
}

/// Extractor guarding mutating routes: requires a valid, unexpired
/// `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;
        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let username = verify_token(&state.settings, token).ok_or(StatusCode::UNAUTHORIZED)?;
        Ok(AuthenticatedUser { username })
    }
}
