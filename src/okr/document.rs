//! Document codec
//!
//! Serializes the structured fields of an Objective or KR into the single
//! description string of its backing ticket, and parses them back out.
//! Parsing is tolerant by contract: every field has a default, malformed or
//! legacy text degrades instead of failing, and any content the codec does
//! not own (notably the activity table) survives a round trip verbatim.
//!
//! Updates are whole-document replaces: the current text is parsed, the
//! supplied fields are merged over the parsed values, and the full document
//! is re-rendered. Re-rendering unchanged fields is byte-stable, so
//! repeated edits do not accumulate drift.

use regex::Regex;

use crate::models::{FieldUpdate, KrUpdateRequest};
use crate::okr::activity_table::{self, TABLE_HEADER};

/// Header of the quoted description section on a KR ticket.
pub const KR_DESCRIPTION_HEADER: &str = "### Descrição";
/// Header of the quoted description section on an Objective ticket.
/// The double space and trailing colon are load-bearing: they are the
/// canonical bytes of every existing objective ticket.
pub const OBJECTIVE_DESCRIPTION_HEADER: &str = "###  Descrição:";
/// Header of the KR checklist section on an Objective ticket.
pub const KR_SECTION_HEADER: &str = "### Resultados Chave";

/// Rendered when a description is empty or whitespace-only.
pub const DESCRIPTION_PLACEHOLDER: &str = "Sem descrição";
/// Rendered when the owners list is empty.
pub const NO_OWNERS: &str = "N/A";

const TARGET_LABEL: &str = "Meta prevista";
const ACHIEVED_LABEL: &str = "Meta realizada";
const OWNERS_LABEL: &str = "Responsável(eis)";

/// The structured fields of one KR document.
#[derive(Debug, Clone, PartialEq)]
pub struct KrFields {
    pub description: String,
    pub meta_prevista: f64,
    pub meta_realizada: f64,
    pub responsaveis: Vec<String>,
    /// The activity table section, header included, preserved verbatim.
    pub activity_table: String,
}

impl KrFields {
    /// Fields for a freshly created KR: supplied values plus an empty table.
    pub fn new(
        description: String,
        meta_prevista: f64,
        meta_realizada: f64,
        responsaveis: Vec<String>,
    ) -> Self {
        Self {
            description,
            meta_prevista,
            meta_realizada,
            responsaveis,
            activity_table: activity_table::empty_table(),
        }
    }
}

/// The structured fields of one Objective document.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveFields {
    pub description: String,
    /// The `### Resultados Chave` section, header included, preserved
    /// verbatim (empty when the section is missing).
    pub kr_section: String,
}

/// One extractable metric line: rendered label, tolerant pattern, default.
struct MetricSpec {
    label: &'static str,
    pattern: Regex,
    default: f64,
}

impl MetricSpec {
    fn new(label: &'static str) -> Self {
        // Tolerates the legacy `**Label:** 10%` form, case differences and
        // decimal comma alongside the canonical `**Label**: 10%`.
        let pattern = Regex::new(&format!(
            r"(?i)\*\*{}:?\*\*:?\s*([0-9]+(?:[.,][0-9]+)?)\s*%",
            regex::escape(label)
        ))
        .expect("valid metric pattern");
        Self {
            label,
            pattern,
            default: 0.0,
        }
    }

    fn render(&self, value: f64) -> String {
        format!("**{}**: {}%", self.label, value)
    }

    fn extract(&self, text: &str) -> f64 {
        self.pattern
            .captures(text)
            .and_then(|captures| captures[1].replace(',', ".").parse().ok())
            .unwrap_or(self.default)
    }
}

pub struct DocumentCodec {
    description_header: Regex,
    target: MetricSpec,
    achieved: MetricSpec,
    owners_pattern: Regex,
    blank_run: Regex,
}

impl DocumentCodec {
    pub fn new() -> Self {
        Self {
            // Matches both the KR form (`### Descrição`) and the objective
            // form (`###  Descrição:`).
            description_header: Regex::new(r"(?m)^###\s{1,2}Descrição:?[ \t]*$")
                .expect("valid description header pattern"),
            target: MetricSpec::new(TARGET_LABEL),
            achieved: MetricSpec::new(ACHIEVED_LABEL),
            // Tolerates the legacy plural `Responsáveis` and the
            // bold-includes-colon form.
            owners_pattern: Regex::new(r"(?i)\*\*respons[áa]ve(?:l\(eis\)|is):?\*\*:?[ \t]*(.+)")
                .expect("valid owners pattern"),
            blank_run: Regex::new(r"\n{3,}").expect("valid blank run pattern"),
        }
    }

    // ========================================================================
    // KR documents
    // ========================================================================

    /// Render the canonical KR document.
    pub fn render_kr(&self, fields: &KrFields) -> String {
        let owners = if fields.responsaveis.is_empty() {
            NO_OWNERS.to_string()
        } else {
            fields.responsaveis.join(", ")
        };
        let owners_line = format!("**{OWNERS_LABEL}**: {owners}");

        let document = format!(
            "{}\n{}\n\n{}\n{}\n{}\n\n{}",
            KR_DESCRIPTION_HEADER,
            quote_block(&fields.description),
            self.target.render(fields.meta_prevista),
            self.achieved.render(fields.meta_realizada),
            owners_line,
            fields.activity_table.trim_end(),
        );

        self.collapse_blank_lines(&document)
    }

    /// Recover the structured fields from raw KR text.
    ///
    /// Never fails: absent or malformed sections fall back to their
    /// defaults (empty description, 0 percentages, no owners, empty table).
    pub fn parse_kr(&self, text: &str) -> KrFields {
        // Everything the field patterns see excludes the table so a table
        // cell can never shadow a metric line.
        let (body, activity_table) = match text.find(TABLE_HEADER) {
            Some(index) => (&text[..index], text[index..].trim_end().to_string()),
            None => (text, activity_table::empty_table()),
        };

        KrFields {
            description: self.extract_quoted_description(body),
            meta_prevista: self.target.extract(body),
            meta_realizada: self.achieved.extract(body),
            responsaveis: self.extract_owners(body),
            activity_table,
        }
    }

    /// Merge a partial update over the current text and re-render.
    ///
    /// Only supplied fields replace parsed values; everything else,
    /// including the activity table, is carried through unchanged. The
    /// result is the only description that should ever be written back.
    pub fn apply_kr_update(&self, current_text: &str, update: &KrUpdateRequest) -> String {
        let mut fields = self.parse_kr(current_text);

        if let FieldUpdate::Set(description) = &update.description {
            fields.description = description.clone();
        }
        if let FieldUpdate::Set(value) = &update.meta_prevista {
            fields.meta_prevista = *value;
        }
        if let FieldUpdate::Set(value) = &update.meta_realizada {
            fields.meta_realizada = *value;
        }
        if let FieldUpdate::Set(owners) = &update.responsaveis {
            fields.responsaveis = owners.clone();
        }

        self.render_kr(&fields)
    }

    // ========================================================================
    // Objective documents
    // ========================================================================

    /// Render a new Objective document with an empty KR checklist.
    pub fn render_objective(&self, description: &str) -> String {
        format!(
            "{}\n\n{}\n\n{}",
            OBJECTIVE_DESCRIPTION_HEADER,
            quote_block(description),
            KR_SECTION_HEADER
        )
    }

    /// Re-render an Objective document around a preserved KR section.
    pub fn render_objective_with_section(&self, description: &str, kr_section: &str) -> String {
        if kr_section.is_empty() {
            return self.render_objective(description);
        }
        let document = format!(
            "{}\n\n{}\n\n{}",
            OBJECTIVE_DESCRIPTION_HEADER,
            quote_block(description),
            kr_section.trim_end()
        );
        self.collapse_blank_lines(&document)
    }

    /// Recover the structured fields from raw Objective text.
    pub fn parse_objective(&self, text: &str) -> ObjectiveFields {
        let kr_section = match text.find(KR_SECTION_HEADER) {
            Some(index) => text[index..].trim_end().to_string(),
            None => String::new(),
        };
        let body = match text.find(KR_SECTION_HEADER) {
            Some(index) => &text[..index],
            None => text,
        };
        ObjectiveFields {
            description: self.extract_quoted_description(body),
            kr_section,
        }
    }

    /// The checklist line an Objective carries for one of its KRs.
    pub fn checklist_line(kr_title: &str, reference_label: &str) -> String {
        format!("- [ ] **{kr_title}** ~\"{reference_label}\"")
    }

    /// Insert a checklist line directly after the `### Resultados Chave`
    /// header, ahead of any existing lines. When the section is missing
    /// (legacy objectives) it is appended at the end of the document.
    pub fn insert_checklist_line(&self, objective_text: &str, line: &str) -> String {
        match objective_text.find(KR_SECTION_HEADER) {
            Some(index) => {
                let header_end = index + KR_SECTION_HEADER.len();
                format!(
                    "{}\n{}{}",
                    &objective_text[..header_end],
                    line,
                    &objective_text[header_end..]
                )
            }
            None => format!(
                "{}\n\n{}\n{}\n",
                objective_text.trim_end(),
                KR_SECTION_HEADER,
                line
            ),
        }
    }

    // ========================================================================
    // Shared extraction
    // ========================================================================

    /// Collect the contiguous quoted block of the description section and
    /// re-join it without the quote markers.
    fn extract_quoted_description(&self, text: &str) -> String {
        let search_from = match self.description_header.find(text) {
            Some(header) => header.end(),
            // Legacy text without a header still gets its first quote
            // block recognized.
            None => 0,
        };

        let mut lines = Vec::new();
        let mut in_block = false;
        for line in text[search_from..].lines() {
            let trimmed = line.trim_start();
            if let Some(rest) = trimmed.strip_prefix('>') {
                lines.push(rest.strip_prefix(' ').unwrap_or(rest));
                in_block = true;
            } else if in_block {
                break;
            } else if !trimmed.is_empty() {
                // Prose before any quote marker means this section has no
                // quoted block.
                break;
            }
        }
        lines.join("\n")
    }

    fn extract_owners(&self, text: &str) -> Vec<String> {
        let Some(captures) = self.owners_pattern.captures(text) else {
            return Vec::new();
        };
        let owners: Vec<String> = captures[1]
            .split(',')
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
            .map(str::to_string)
            .collect();
        if owners == [NO_OWNERS] {
            return Vec::new();
        }
        owners
    }

    /// Template assembly around empty fields can stack blank lines; cap
    /// runs at one blank line so output stays stable under repeated edits.
    fn collapse_blank_lines(&self, text: &str) -> String {
        self.blank_run.replace_all(text, "\n\n").into_owned()
    }
}

impl Default for DocumentCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote every line of `text` with the markdown `> ` marker. Empty input
/// renders the placeholder sentinel instead of an empty quote block.
fn quote_block(text: &str) -> String {
    if text.trim().is_empty() {
        return format!("> {DESCRIPTION_PLACEHOLDER}");
    }
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
