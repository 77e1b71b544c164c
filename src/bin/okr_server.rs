use std::sync::Arc;

use tracing::info;

use okr_tracker::api::{self, AppState};
use okr_tracker::config::Settings;
use okr_tracker::gitlab::GitlabClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "okr_tracker=info,tower_http=info".into()),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    info!(
        project = %settings.gitlab_project_id,
        "Connecting to GitLab at {}",
        settings.gitlab_api_url
    );

    let store = Arc::new(GitlabClient::new(&settings)?);
    let port = settings.port;
    let state = AppState::new(store, settings);

    let app = api::router(state);

    let addr = format!("0.0.0.0:{port}");
    info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
