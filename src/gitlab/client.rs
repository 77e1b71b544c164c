//! GitLab REST client
//!
//! `TicketStore` implementation over the GitLab v4 project-issues API.
//! One client instance is shared across all services; it owns the HTTP
//! connection pool and the project scoping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::Settings;
use crate::error::{OkrError, OkrResult};
use crate::gitlab::store::TicketStore;
use crate::gitlab::types::{Ticket, TicketLink, TicketUpdate};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const PAGE_SIZE: usize = 100;
// Backstop against runaway pagination on very large projects.
const MAX_PAGES: usize = 50;

pub struct GitlabClient {
    client: Client,
    base_url: String,
    project_path: String,
    token: String,
}

impl GitlabClient {
    pub fn new(settings: &Settings) -> OkrResult<Self> {
        Url::parse(&settings.gitlab_api_url)
            .map_err(|e| OkrError::validation(format!("Invalid GITLAB_API_URL: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| OkrError::upstream(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.gitlab_api_url.trim_end_matches('/').to_string(),
            // Project may be addressed by numeric id or by full path; a
            // path must be percent-encoded in the URL.
            project_path: settings.gitlab_project_id.replace('/', "%2F"),
            token: settings.gitlab_access_token.clone(),
        })
    }

    fn issues_url(&self, suffix: &str) -> String {
        format!(
            "{}/api/v4/projects/{}/issues{}",
            self.base_url, self.project_path, suffix
        )
    }

    async fn error_from_response(&self, response: reqwest::Response) -> OkrError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        OkrError::upstream(format!(
            "GitLab API error {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        ))
    }
}

#[async_trait]
impl TicketStore for GitlabClient {
    async fn create_ticket(
        &self,
        title: &str,
        description: &str,
        labels: &[String],
    ) -> OkrResult<Ticket> {
        let url = self.issues_url("");
        let payload = serde_json::json!({
            "title": title,
            "description": description,
            "labels": labels.join(","),
        });

        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        let ticket: Ticket = response.json().await?;
        tracing::debug!(iid = ticket.iid, "Created ticket");
        Ok(ticket)
    }

    async fn get_ticket(&self, iid: u64) -> OkrResult<Ticket> {
        let url = self.issues_url(&format!("/{iid}"));
        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(OkrError::NotFound(iid));
        }
        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    async fn update_ticket(&self, iid: u64, update: TicketUpdate) -> OkrResult<Ticket> {
        if update.is_empty() {
            return self.get_ticket(iid).await;
        }

        let url = self.issues_url(&format!("/{iid}"));
        let response = self
            .client
            .put(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&update)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(OkrError::NotFound(iid));
        }
        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        // Re-fetch so callers see the state the tracker actually stored,
        // not the echo of the write.
        self.get_ticket(iid).await
    }

    async fn list_tickets(&self, labels: &[String]) -> OkrResult<Vec<Ticket>> {
        let mut all_tickets = Vec::new();
        let mut page = 1;

        loop {
            let mut url = format!(
                "{}?per_page={}&page={}",
                self.issues_url(""),
                PAGE_SIZE,
                page
            );
            if !labels.is_empty() {
                url.push_str(&format!("&labels={}", labels.join(",")));
            }

            let response = self
                .client
                .get(&url)
                .header("PRIVATE-TOKEN", &self.token)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(self.error_from_response(response).await);
            }

            let batch: Vec<Ticket> = response.json().await?;
            let count = batch.len();
            all_tickets.extend(batch);

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
            if page > MAX_PAGES {
                tracing::warn!(pages = MAX_PAGES, "Reached max pages listing tickets");
                break;
            }
        }

        Ok(all_tickets)
    }

    async fn link_tickets(&self, source_iid: u64, target_iid: u64) -> OkrResult<TicketLink> {
        let url = self.issues_url(&format!("/{source_iid}/links"));
        let payload = serde_json::json!({
            "target_project_id": self.project_path,
            "target_issue_iid": target_iid,
        });

        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(OkrError::NotFound(target_iid));
        }
        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        tracing::debug!(source_iid, target_iid, "Linked tickets");
        Ok(TicketLink {
            source_iid,
            target_iid,
        })
    }

    async fn list_links(&self, iid: u64) -> OkrResult<Vec<Ticket>> {
        let url = self.issues_url(&format!("/{iid}/links"));
        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(OkrError::NotFound(iid));
        }
        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }

        Ok(response.json().await?)
    }
}
