//! Process configuration
//!
//! All settings come from environment variables (a `.env` file is loaded by
//! the server binary before this runs). Label lists arrive as one
//! comma-separated string per variable, optionally wrapped in quotes, and
//! are parsed into clean lists here.

use crate::error::{OkrError, OkrResult};

/// Runtime settings for the tracker.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the GitLab instance, e.g. `https://gitlab.com`.
    pub gitlab_api_url: String,
    /// Private token used for all ticket store calls.
    pub gitlab_access_token: String,
    /// Project whose issues back the OKR entities.
    pub gitlab_project_id: String,

    /// Labels that classify a ticket as an Objective.
    pub gitlab_objective_labels: Vec<String>,
    /// Labels that classify a ticket as a Key Result.
    pub gitlab_kr_labels: Vec<String>,
    /// Scoped label referenced from an Objective's checklist lines.
    pub kr_reference_label: String,

    /// Credentials accepted by the token endpoint.
    pub auth_username: String,
    pub auth_password: String,
    /// Secret used to sign bearer tokens.
    pub auth_secret: String,
    /// Token lifetime in minutes.
    pub auth_token_expire_minutes: i64,

    /// Port the REST server binds to.
    pub port: u16,
}

impl Settings {
    /// Build settings from the process environment.
    pub fn from_env() -> OkrResult<Self> {
        let gitlab_api_url = std::env::var("GITLAB_API_URL")
            .unwrap_or_else(|_| "https://gitlab.com".to_string());
        let gitlab_access_token = required_var("GITLAB_ACCESS_TOKEN")?;
        let gitlab_project_id = required_var("GITLAB_PROJECT_ID")?;

        let gitlab_objective_labels =
            parse_label_list(&std::env::var("GITLAB_OBJECTIVE_LABELS").unwrap_or_default());
        let gitlab_kr_labels =
            parse_label_list(&std::env::var("GITLAB_KR_LABELS").unwrap_or_default());

        // The checklist reference defaults to the first KR label so the
        // Objective's checklist lines stay consistent with the KR filter.
        let kr_reference_label = std::env::var("KR_REFERENCE_LABEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| gitlab_kr_labels.first().cloned())
            .unwrap_or_else(|| "KR".to_string());

        let auth_username = std::env::var("AUTH_USERNAME").unwrap_or_default();
        let auth_password = std::env::var("AUTH_PASSWORD").unwrap_or_default();
        let auth_secret = std::env::var("AUTH_SECRET").unwrap_or_default();
        let auth_token_expire_minutes = std::env::var("AUTH_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000);

        Ok(Settings {
            gitlab_api_url,
            gitlab_access_token,
            gitlab_project_id,
            gitlab_objective_labels,
            gitlab_kr_labels,
            kr_reference_label,
            auth_username,
            auth_password,
            auth_secret,
            auth_token_expire_minutes,
            port,
        })
    }
}

fn required_var(name: &str) -> OkrResult<String> {
    std::env::var(name)
        .map_err(|_| OkrError::validation(format!("Missing required environment variable {name}")))
}

/// Parse a comma-separated label list.
///
/// Tolerates surrounding quotes and stray whitespace; empty items are
/// dropped. `"A, B"` and `A,B` both yield `["A", "B"]`.
pub fn parse_label_list(raw: &str) -> Vec<String> {
    let mut value = raw.trim();
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        value = &value[1..value.len() - 1];
    }
    if value.is_empty() {
        return Vec::new();
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}
