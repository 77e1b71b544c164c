//! Entity services
//!
//! Use-case orchestration over the ticket store. Each service is a plain
//! struct constructed with an injected `Arc<dyn TicketStore>`; lifecycle
//! belongs to process bootstrap, not to module initialization.

pub mod activity_service;
pub mod kr_service;
pub mod objective_service;

pub use activity_service::ActivityService;
pub use kr_service::KrService;
pub use objective_service::ObjectiveService;

use crate::error::{OkrError, OkrResult};

/// Percentages are validated here, at the service boundary; the document
/// codec itself neither clamps nor rejects.
pub(crate) fn validate_percent(value: f64, field: &str) -> OkrResult<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(OkrError::validation(format!(
            "{field} must be between 0 and 100, got {value}"
        )))
    }
}

/// Deduplicate labels while preserving configured order.
pub(crate) fn dedup_labels(labels: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for label in labels {
        if !seen.contains(label) {
            seen.push(label.clone());
        }
    }
    seen
}
