//! Activity table codec
//!
//! The activity log of a KR is an append-only markdown table trailing its
//! description. Rows are never edited or removed, only appended; the
//! header is initialized when the KR had no description at all.

use crate::models::Activity;

pub const TABLE_HEADER: &str = "| Projetos/Ações/Atividades | Partes interessadas | Prazo Previsto | Prazo Realizado | % Previsto | % Realizado |";
pub const TABLE_SEPARATOR: &str = "|---------------------------|----------------------|----------------|-----------------|------------|-------------|";

/// An empty table: header and separator, no rows.
pub fn empty_table() -> String {
    format!("{TABLE_HEADER}\n{TABLE_SEPARATOR}")
}

/// How new rows are attached to an existing description.
///
/// The two variants reflect two call sites of the source system that never
/// agreed: the structured-update path re-locates the table before writing,
/// the simple-append path does not. The choice stays explicit at the call
/// site instead of being silently unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendStrategy {
    /// Append rows to the end of the description as-is. Never re-emits a
    /// header into a non-empty description, so a KR that already carries a
    /// table gets bare rows appended after it, and a KR with prose but no
    /// table gets rows with no header at all.
    BlindAppend,
    /// Locate the existing table first; emit a header only when none is
    /// present.
    MergeIntoTable,
}

/// Render one activity as a table row. Missing optional fields become
/// empty cells.
pub fn render_row(activity: &Activity) -> String {
    format!(
        "| {} | {} | {} | {} | {}% | {}% |",
        activity.project_action_activity,
        activity.stakeholders,
        activity.deadline_planned,
        activity.deadline_achieved.as_deref().unwrap_or(""),
        activity.progress_planned_percent,
        activity.progress_achieved_percent,
    )
}

/// Append `activities` to `current_description` under the given strategy.
///
/// Existing content is preserved verbatim; with no activities to add the
/// description comes back unchanged (modulo nothing: not even whitespace
/// is touched).
pub fn append_rows(
    current_description: &str,
    activities: &[Activity],
    strategy: AppendStrategy,
) -> String {
    let rows: Vec<String> = activities.iter().map(render_row).collect();
    let new_rows = rows.join("\n");

    if new_rows.is_empty() {
        return current_description.to_string();
    }

    if current_description.trim().is_empty() {
        return format!("{}\n{}", empty_table(), new_rows);
    }

    match strategy {
        AppendStrategy::BlindAppend => {
            format!("{}\n{}", current_description.trim_end(), new_rows)
        }
        AppendStrategy::MergeIntoTable => {
            if current_description.contains(TABLE_HEADER) {
                format!("{}\n{}", current_description.trim_end(), new_rows)
            } else {
                format!(
                    "{}\n\n{}\n{}",
                    current_description.trim_end(),
                    empty_table(),
                    new_rows
                )
            }
        }
    }
}

/// Parse the rows of a table section back into activities.
///
/// `table_text` is the slice starting at the table header. Header and
/// separator lines are skipped; rows that do not carry all six cells are
/// ignored rather than failing the parse.
pub fn parse_rows(table_text: &str) -> Vec<Activity> {
    let mut activities = Vec::new();
    for line in table_text.lines() {
        let line = line.trim();
        if !line.starts_with('|') {
            continue;
        }
        if line == TABLE_HEADER || line.starts_with("|-") {
            continue;
        }

        let cells: Vec<&str> = line
            .trim_matches('|')
            .split('|')
            .map(str::trim)
            .collect();
        if cells.len() < 6 {
            continue;
        }

        activities.push(Activity {
            project_action_activity: cells[0].to_string(),
            stakeholders: cells[1].to_string(),
            deadline_planned: cells[2].to_string(),
            deadline_achieved: if cells[3].is_empty() {
                None
            } else {
                Some(cells[3].to_string())
            },
            progress_planned_percent: parse_percent_cell(cells[4]),
            progress_achieved_percent: parse_percent_cell(cells[5]),
        });
    }
    activities
}

fn parse_percent_cell(cell: &str) -> f64 {
    cell.trim_end_matches('%')
        .trim()
        .replace(',', ".")
        .parse()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_activity() -> Activity {
        Activity {
            project_action_activity: "Develop feature X".to_string(),
            stakeholders: "Team Alpha".to_string(),
            deadline_planned: "Q1/2024".to_string(),
            deadline_achieved: Some("Q1/2024".to_string()),
            progress_planned_percent: 100.0,
            progress_achieved_percent: 100.0,
        }
    }

    #[test]
    fn renders_full_row() {
        assert_eq!(
            render_row(&sample_activity()),
            "| Develop feature X | Team Alpha | Q1/2024 | Q1/2024 | 100% | 100% |"
        );
    }

    #[test]
    fn missing_deadline_renders_empty_cell_not_none() {
        let activity = Activity {
            deadline_achieved: None,
            progress_planned_percent: 50.0,
            progress_achieved_percent: 0.0,
            ..sample_activity()
        };
        let row = render_row(&activity);
        assert!(row.contains("| Q1/2024 |  | 50% |"));
        assert!(!row.contains("None"));
    }

    #[test]
    fn empty_description_gets_header_and_rows() {
        let result = append_rows("", &[sample_activity()], AppendStrategy::BlindAppend);
        let mut lines = result.lines();
        assert_eq!(lines.next(), Some(TABLE_HEADER));
        assert_eq!(lines.next(), Some(TABLE_SEPARATOR));
        assert!(lines.next().unwrap().starts_with("| Develop feature X |"));
    }

    #[test]
    fn blind_append_never_re_emits_header() {
        let current = format!("Some KR text\n\n{}\n| A | B | C | D | 10% | 0% |", empty_table());
        let result = append_rows(&current, &[sample_activity()], AppendStrategy::BlindAppend);
        assert_eq!(result.matches(TABLE_HEADER).count(), 1);
        assert!(result.ends_with("| Develop feature X | Team Alpha | Q1/2024 | Q1/2024 | 100% | 100% |"));
    }

    #[test]
    fn blind_append_on_prose_only_description_adds_bare_rows() {
        let result = append_rows(
            "### KR Details\nSome existing content.",
            &[sample_activity()],
            AppendStrategy::BlindAppend,
        );
        assert_eq!(
            result,
            "### KR Details\nSome existing content.\n| Develop feature X | Team Alpha | Q1/2024 | Q1/2024 | 100% | 100% |"
        );
    }

    #[test]
    fn merge_strategy_adds_header_when_table_missing() {
        let result = append_rows(
            "Prose only.",
            &[sample_activity()],
            AppendStrategy::MergeIntoTable,
        );
        assert_eq!(result.matches(TABLE_HEADER).count(), 1);
        assert!(result.starts_with("Prose only.\n\n|"));
    }

    #[test]
    fn no_activities_leaves_description_untouched() {
        let current = "whatever  \n";
        assert_eq!(append_rows(current, &[], AppendStrategy::BlindAppend), current);
    }

    #[test]
    fn parses_rows_skipping_header_and_separator() {
        let table = format!(
            "{}\n{}\n| Plan phase 2 | Product Owner | Q2/2024 |  | 50% | 0% |",
            TABLE_HEADER, TABLE_SEPARATOR
        );
        let activities = parse_rows(&table);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].project_action_activity, "Plan phase 2");
        assert_eq!(activities[0].deadline_achieved, None);
        assert_eq!(activities[0].progress_planned_percent, 50.0);
        assert_eq!(activities[0].progress_achieved_percent, 0.0);
    }

    #[test]
    fn round_trips_rendered_rows() {
        let activity = sample_activity();
        let table = format!("{}\n{}", empty_table(), render_row(&activity));
        assert_eq!(parse_rows(&table), vec![activity]);
    }
}
