//! Tool results as a closed enum, plus the guard that keeps the pipeline
//! honest: a result shaped like data must be able to name the reads behind
//! it, or the turn fails instead of reaching the formatter.

use rota_core::query::ClarificationRequest;
use rota_core::{IsoWeek, ResolvedScope, TimeWindow, Weekday};

use crate::error::AssistantError;
use crate::suggest::Candidate;

/// One audited read: which view, which week(s) if the view is week-keyed,
/// and how many rows came back.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRead {
    pub view: String,
    pub weeks: Vec<IsoWeek>,
    pub row_count: usize,
}

impl SourceRead {
    pub fn weekless(view: impl Into<String>, row_count: usize) -> Self {
        SourceRead {
            view: view.into(),
            weeks: Vec::new(),
            row_count,
        }
    }

    pub fn for_week(view: impl Into<String>, week: IsoWeek, row_count: usize) -> Self {
        SourceRead {
            view: view.into(),
            weeks: vec![week],
            row_count,
        }
    }

    pub fn render(&self) -> String {
        let noun = if self.row_count == 1 { "row" } else { "rows" };
        match self.weeks.as_slice() {
            [] => format!("{} ({} {noun})", self.view, self.row_count),
            [week] => format!("{} (week {week}, {} {noun})", self.view, self.row_count),
            weeks => {
                let joined = weeks
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" vs ");
                format!("{} (weeks {joined}, {} {noun})", self.view, self.row_count)
            }
        }
    }
}

/// Everything a routed question can come back as. The guard and the
/// formatter both match exhaustively, so adding a variant is a
/// compile-checked change in both places.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    Metric {
        metric: String,
        rows: Vec<serde_json::Value>,
        sources: Vec<SourceRead>,
    },
    AdHoc {
        name: String,
        rows: Vec<serde_json::Value>,
        sources: Vec<SourceRead>,
    },
    Suggestions {
        day: Weekday,
        window: Option<TimeWindow>,
        work_type: Option<String>,
        candidates: Vec<Candidate>,
        sources: Vec<SourceRead>,
    },
    ScopeChanged {
        scope: ResolvedScope,
        sources: Vec<SourceRead>,
    },
    Clarification(ClarificationRequest),
    /// Turn-level failure already logged; the formatter renders a generic
    /// retry message.
    Error(String),
}

impl ToolOutcome {
    pub fn sources(&self) -> &[SourceRead] {
        match self {
            ToolOutcome::Metric { sources, .. }
            | ToolOutcome::AdHoc { sources, .. }
            | ToolOutcome::Suggestions { sources, .. }
            | ToolOutcome::ScopeChanged { sources, .. } => sources,
            ToolOutcome::Clarification(_) | ToolOutcome::Error(_) => &[],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ToolOutcome::Metric { .. } => "metric",
            ToolOutcome::AdHoc { .. } => "ad_hoc",
            ToolOutcome::Suggestions { .. } => "suggestions",
            ToolOutcome::ScopeChanged { .. } => "scope_changed",
            ToolOutcome::Clarification(_) => "clarification",
            ToolOutcome::Error(_) => "error",
        }
    }
}

/// Fail-closed check run on every outcome before formatting. Clarifications
/// and errors read nothing by nature; everything else must cite at least
/// one source or the turn dies here.
pub fn enforce_data_backing(outcome: &ToolOutcome) -> Result<(), AssistantError> {
    match outcome {
        ToolOutcome::Clarification(_) | ToolOutcome::Error(_) => Ok(()),
        backed if !backed.sources().is_empty() => Ok(()),
        unbacked => {
            tracing::error!(
                kind = unbacked.kind(),
                "fail-closed guard tripped: data-shaped result cites no reads"
            );
            Err(AssistantError::Integrity(format!(
                "{} result carries no source reads",
                unbacked.kind()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::query::{ClarificationKind, ClarificationRequest};

    fn week(tag: &str) -> IsoWeek {
        tag.parse().expect("valid week")
    }

    #[test]
    fn source_lines_mention_weeks_only_when_keyed() {
        let weekless = SourceRead::weekless("availability_by_day", 7);
        assert_eq!(weekless.render(), "availability_by_day (7 rows)");

        let weekly = SourceRead::for_week("employee_hours_by_week", week("2025-W43"), 1);
        assert_eq!(weekly.render(), "employee_hours_by_week (week 2025-W43, 1 row)");

        let compared = SourceRead {
            view: "employee_hours_by_week".to_string(),
            weeks: vec![week("2025-W43"), week("2025-W42")],
            row_count: 12,
        };
        assert_eq!(
            compared.render(),
            "employee_hours_by_week (weeks 2025-W43 vs 2025-W42, 12 rows)"
        );
    }

    #[test]
    fn guard_rejects_unbacked_data_results() {
        let unbacked = ToolOutcome::Metric {
            metric: "hours_for_week".to_string(),
            rows: vec![serde_json::json!({"employee_name": "Bob Smith"})],
            sources: Vec::new(),
        };
        let error = enforce_data_backing(&unbacked).expect_err("guard fires");
        assert!(error.to_string().contains("metric"));

        let backed = ToolOutcome::Metric {
            metric: "hours_for_week".to_string(),
            rows: Vec::new(),
            sources: vec![SourceRead::for_week(
                "employee_hours_by_week",
                week("2025-W43"),
                0,
            )],
        };
        enforce_data_backing(&backed).expect("zero rows with a cited read passes");
    }

    #[test]
    fn guard_exempts_clarification_and_error() {
        let clarification = ToolOutcome::Clarification(ClarificationRequest {
            kind: ClarificationKind::Day,
            message: "Which day do you mean?".to_string(),
            options: Vec::new(),
        });
        enforce_data_backing(&clarification).expect("clarifications read nothing");

        let error = ToolOutcome::Error("internal".to_string());
        enforce_data_backing(&error).expect("errors read nothing");
    }
}
