//! Request, response and domain models
//!
//! These are the shapes crossing the service boundary. Everything persisted
//! lives inside ticket descriptions; the view models expose the raw
//! description plus the identity fields derived from titles and labels.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Partial updates
// ============================================================================

/// Explicit per-field update state.
///
/// A missing key in an update payload means "keep the current value";
/// a present key, including an empty string or empty list, means
/// "set to this value". Modeling the distinction as a variant removes the
/// ambiguity of `Option` doing double duty for both.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, FieldUpdate::Unchanged)
    }

    /// The supplied value, or `current` when the field was not supplied.
    pub fn resolve(self, current: T) -> T {
        match self {
            FieldUpdate::Unchanged => current,
            FieldUpdate::Set(value) => value,
        }
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Unchanged => None,
            FieldUpdate::Set(value) => Some(value),
        }
    }
}

// A bare value deserializes as Set; absent fields fall back to the
// `#[serde(default)]` Unchanged.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(FieldUpdate::Set)
    }
}

// ============================================================================
// Objectives
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveCreateRequest {
    pub obj_number: u32,
    pub title: String,
    pub description: String,
    pub team_label: String,
    pub product_label: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectiveUpdateRequest {
    #[serde(default)]
    pub title: FieldUpdate<String>,
    #[serde(default)]
    pub description: FieldUpdate<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveResponse {
    /// Ticket iid in the backing project.
    pub id: u64,
    pub title: String,
    pub description: String,
    pub web_url: String,
    pub team_label: String,
    pub product_label: String,
}

// ============================================================================
// Key Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KrCreateRequest {
    /// Ticket iid of the parent objective.
    pub objective_iid: u64,
    pub kr_number: u32,
    pub title: String,
    /// Detailed description of the KR itself.
    pub description: String,
    /// Target percentage ("meta prevista"), 0–100.
    pub meta_prevista: f64,
    /// Achieved percentage ("meta realizada"), 0–100.
    #[serde(default)]
    pub meta_realizada: f64,
    pub responsaveis: Vec<String>,
    #[serde(default)]
    pub team_label: Option<String>,
    #[serde(default)]
    pub product_label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KrUpdateRequest {
    #[serde(default)]
    pub description: FieldUpdate<String>,
    #[serde(default)]
    pub meta_prevista: FieldUpdate<f64>,
    #[serde(default)]
    pub meta_realizada: FieldUpdate<f64>,
    #[serde(default)]
    pub responsaveis: FieldUpdate<Vec<String>>,
}

impl KrUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.description.is_unchanged()
            && self.meta_prevista.is_unchanged()
            && self.meta_realizada.is_unchanged()
            && self.responsaveis.is_unchanged()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KrResponse {
    /// Ticket iid in the backing project.
    pub id: u64,
    /// Raw composed ticket title, e.g. `OBJ1 - KR2: Expand into EMEA`.
    pub title: String,
    /// Sequence number recovered from the title; 0 for hand-edited titles.
    pub kr_number: u32,
    /// Human title without the `OBJ`/`KR` markers.
    pub display_title: String,
    /// Full description, including metadata lines and the activities table.
    pub description: String,
    pub web_url: String,
    /// Parent objective iid, when it could be resolved from link records.
    pub objective_iid: Option<u64>,
    pub team_label: String,
    pub product_label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KrDescriptionUpdateRequest {
    pub description: String,
}

// ============================================================================
// Activities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub project_action_activity: String,
    pub stakeholders: String,
    /// e.g. "Month/Year" or a specific date string.
    pub deadline_planned: String,
    #[serde(default)]
    pub deadline_achieved: Option<String>,
    pub progress_planned_percent: f64,
    #[serde(default)]
    pub progress_achieved_percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityCreateRequest {
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescriptionResponse {
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_as_unchanged() {
        let update: KrUpdateRequest = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn present_empty_fields_deserialize_as_set() {
        let update: KrUpdateRequest =
            serde_json::from_str(r#"{"description": "", "responsaveis": []}"#).unwrap();
        assert_eq!(update.description, FieldUpdate::Set(String::new()));
        assert_eq!(update.responsaveis, FieldUpdate::Set(vec![]));
        assert!(update.meta_prevista.is_unchanged());
    }

    #[test]
    fn supplied_values_deserialize_as_set() {
        let update: KrUpdateRequest =
            serde_json::from_str(r#"{"meta_realizada": 40}"#).unwrap();
        assert_eq!(update.meta_realizada, FieldUpdate::Set(40.0));
    }
}
