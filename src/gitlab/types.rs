//! Wire types for the ticket store

use serde::{Deserialize, Serialize};

/// One ticket of the external issue tracker.
///
/// Stands in for a database row: entity fields live in `description`,
/// classification lives in `labels`, relations live in link records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Project-scoped ticket id, assigned by the store and immutable.
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub web_url: String,
}

impl Ticket {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// True when this ticket carries every label in `filter`.
    pub fn has_all_labels(&self, filter: &[String]) -> bool {
        filter.iter().all(|label| self.labels.contains(label))
    }
}

/// Partial ticket update; unset fields are left untouched by the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl TicketUpdate {
    pub fn description(description: impl Into<String>) -> Self {
        TicketUpdate {
            description: Some(description.into()),
            ..TicketUpdate::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.labels.is_none()
    }
}

/// A directional association between two tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketLink {
    pub source_iid: u64,
    pub target_iid: u64,
}
