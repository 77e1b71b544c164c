//! Title and label classification
//!
//! Entity identity is not a native concept of the ticket store: the
//! objective number lives in the ticket title (`OBJ<n>: ...`), the KR
//! number in its composed title (`... - KR<n>: ...`), and team/product
//! in label prefixes. This module recovers that identity from
//! human-edited text without ever failing; malformed input degrades to
//! documented fallbacks.

use regex::Regex;

/// Label prefix marking the owning team, e.g. `TEAM::Growth`.
pub const TEAM_LABEL_PREFIX: &str = "TEAM::";
/// Label prefix marking the product line, e.g. `PRODUCT::Checkout`.
pub const PRODUCT_LABEL_PREFIX: &str = "PRODUCT::";
/// Sentinel returned when no matching label is present.
pub const UNCLASSIFIED_LABEL: &str = "N/A";

/// Team/product classification derived from a ticket's labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelClassification {
    pub team_label: String,
    pub product_label: String,
}

/// Identity parsed out of a KR ticket title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KrTitleParts {
    /// Sequence number scoped to the parent objective; 0 when the title
    /// does not follow the convention.
    pub kr_number: u32,
    /// Display title: the text after the `KR<n>:` marker, or the full raw
    /// title when the marker is absent.
    pub display_title: String,
}

pub struct TitleClassifier {
    objective_prefix: Regex,
    kr_marker: Regex,
}

impl TitleClassifier {
    pub fn new() -> Self {
        Self {
            objective_prefix: Regex::new(r"^(OBJ\d+):").expect("valid objective prefix pattern"),
            kr_marker: Regex::new(r"- KR(\d+):\s*(.*)").expect("valid KR marker pattern"),
        }
    }

    /// Canonical `OBJ<n>` prefix of an objective, used when composing child
    /// KR titles.
    ///
    /// Falls back to `OBJ<ticket-iid>` for hand-edited titles so every KR
    /// still gets a syntactically valid, unique-enough prefix.
    pub fn objective_prefix(&self, title: &str, objective_iid: u64) -> String {
        match self.objective_prefix.captures(title) {
            Some(captures) => captures[1].to_string(),
            None => format!("OBJ{objective_iid}"),
        }
    }

    /// Split a KR title into its number and display title.
    pub fn split_kr_title(&self, title: &str) -> KrTitleParts {
        match self.kr_marker.captures(title) {
            Some(captures) => KrTitleParts {
                kr_number: captures[1].parse().unwrap_or(0),
                display_title: captures[2].trim().to_string(),
            },
            None => KrTitleParts {
                kr_number: 0,
                display_title: title.to_string(),
            },
        }
    }
}

impl Default for TitleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan labels for the team/product prefixes. First match wins; label
/// order is whatever the ticket store returned.
pub fn classify_labels(labels: &[String]) -> LabelClassification {
    let first_with_prefix = |prefix: &str| {
        labels
            .iter()
            .find(|label| label.starts_with(prefix))
            .cloned()
            .unwrap_or_else(|| UNCLASSIFIED_LABEL.to_string())
    };
    LabelClassification {
        team_label: first_with_prefix(TEAM_LABEL_PREFIX),
        product_label: first_with_prefix(PRODUCT_LABEL_PREFIX),
    }
}
