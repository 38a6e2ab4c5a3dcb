//! Reply rendering. Every reply carries two footer bands: the scope the
//! answer covered and the reads behind it. Bodies are rendered per metric
//! family from the JSON rows; nothing here invents data, it only restates
//! what the executor returned.

use rota_core::time::{render_clock, render_duration};
use rota_core::{ResolvedScope, ScopeMode, TimeWindow, Weekday};

use crate::outcome::{SourceRead, ToolOutcome};
use crate::query::{row_i64, row_str};
use crate::suggest::Candidate;

pub fn render_reply(outcome: &ToolOutcome, scope: &ResolvedScope) -> String {
    format!(
        "{}\n\n{}\n{}",
        body(outcome),
        scope_band(scope),
        source_band(outcome.sources())
    )
}

pub fn scope_band(scope: &ResolvedScope) -> String {
    match scope.mode {
        ScopeMode::HomeOnly => "Scope: this store only".to_string(),
        ScopeMode::AllManaged => {
            format!("Scope: all managed stores ({})", scope.store_ids.len())
        }
        ScopeMode::Specific => format!("Scope: {} selected stores", scope.store_ids.len()),
    }
}

pub fn source_band(sources: &[SourceRead]) -> String {
    if sources.is_empty() {
        return "Sources: none (no data read)".to_string();
    }
    let lines: Vec<String> = sources.iter().map(SourceRead::render).collect();
    format!("Sources: {}", lines.join("; "))
}

fn body(outcome: &ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Metric { metric, rows, .. } => metric_body(metric, rows),
        ToolOutcome::AdHoc { name, rows, .. } => adhoc_body(name, rows),
        ToolOutcome::Suggestions {
            day,
            window,
            work_type,
            candidates,
            ..
        } => suggestions_body(*day, *window, work_type.as_deref(), candidates),
        ToolOutcome::ScopeChanged { scope, .. } => scope_changed_body(scope),
        ToolOutcome::Clarification(request) => {
            let mut text = request.message.clone();
            for (position, option) in request.options.iter().enumerate() {
                text.push_str(&format!("\n{}. {}", position + 1, option.label));
            }
            text
        }
        ToolOutcome::Error(_) => {
            "Something went wrong on our side. Please try rephrasing your question.".to_string()
        }
    }
}

fn metric_body(metric: &str, rows: &[serde_json::Value]) -> String {
    if rows.is_empty() {
        return "No matching data in this scope.".to_string();
    }
    match metric {
        "hours_for_employee" | "hours_for_week" | "hours_top_n" => hours_lines(rows, None),
        "hours_under_target" => hours_lines(rows, Some(("shortfall_minutes", "under"))),
        "hours_over_target" => hours_lines(rows, Some(("surplus_minutes", "over"))),
        "availability_on_day" => availability_day_lines(rows),
        "availability_for_employee" => availability_week_lines(rows),
        "schedule_for_employee" => assignment_lines(rows),
        "who_works_on_day" => who_works_lines(rows),
        "coverage_gaps" => gap_lines(rows),
        "minutes_on_day" => minutes_lines(rows),
        _ => format!("{} matching rows.", rows.len()),
    }
}

fn adhoc_body(name: &str, rows: &[serde_json::Value]) -> String {
    match name {
        "compare_weeks" => {
            if rows.is_empty() {
                return "No scheduled hours in either week.".to_string();
            }
            rows.iter()
                .map(|row| {
                    let anchor = row_i64(row, "minutes_b").unwrap_or(0);
                    let other = row_i64(row, "minutes_a").unwrap_or(0);
                    let delta = row_i64(row, "delta_minutes").unwrap_or(anchor - other);
                    format!(
                        "- {}: {} vs {} ({})",
                        display_name(row),
                        render_duration(anchor as i32),
                        render_duration(other as i32),
                        signed_duration(delta)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        "biggest_gap" => match rows.first() {
            None => "No open slots this week.".to_string(),
            Some(row) => {
                let day = row_str(row, "day").unwrap_or("?");
                let minutes = row_i64(row, "open_minutes").unwrap_or(0);
                let slots = row_i64(row, "open_slots").unwrap_or(0);
                let noun = if slots == 1 { "slot" } else { "slots" };
                format!(
                    "Biggest gap: {day} with {} open across {slots} {noun}.",
                    render_duration(minutes as i32)
                )
            }
        },
        _ => format!("{} matching rows.", rows.len()),
    }
}

fn suggestions_body(
    day: Weekday,
    window: Option<TimeWindow>,
    work_type: Option<&str>,
    candidates: &[Candidate],
) -> String {
    let mut headline = format!("Suggestions for {}", day.as_str());
    if let Some(window) = window {
        headline.push_str(&format!(" {}", window.render()));
    }
    if let Some(role) = work_type {
        headline.push_str(&format!(" ({role})"));
    }
    if candidates.is_empty() {
        return format!("{headline}: no eligible candidates found.");
    }
    let mut lines = vec![format!("{headline}:")];
    for (position, candidate) in candidates.iter().enumerate() {
        lines.push(format!(
            "{}. {} (score {}): {}",
            position + 1,
            candidate.employee_name,
            candidate.score,
            candidate.reasons.join("; ")
        ));
    }
    lines.join("\n")
}

fn scope_changed_body(scope: &ResolvedScope) -> String {
    match scope.mode {
        ScopeMode::HomeOnly => "Scope set to this store only.".to_string(),
        ScopeMode::AllManaged => format!(
            "Scope set to all managed stores ({}).",
            scope.store_ids.len()
        ),
        ScopeMode::Specific => {
            format!("Scope set to {} selected stores.", scope.store_ids.len())
        }
    }
}

fn hours_lines(rows: &[serde_json::Value], extra: Option<(&str, &str)>) -> String {
    rows.iter()
        .map(|row| {
            let scheduled = row_i64(row, "scheduled_minutes").unwrap_or(0);
            let target = row_i64(row, "target_minutes").unwrap_or(0);
            let mut line = format!(
                "- {}: {} scheduled (target {})",
                display_name(row),
                render_duration(scheduled as i32),
                render_duration(target as i32)
            );
            if let Some((key, direction)) = extra {
                if let Some(minutes) = row_i64(row, key) {
                    line.push_str(&format!(
                        ", {} {direction} target",
                        render_duration(minutes as i32)
                    ));
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per employee, their windows joined in row order.
fn availability_day_lines(rows: &[serde_json::Value]) -> String {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for row in rows {
        let name = display_name(row);
        let window = row_window(row);
        match grouped.last_mut() {
            Some((last, windows)) if *last == name => windows.push(window),
            _ => grouped.push((name, vec![window])),
        }
    }
    grouped
        .into_iter()
        .map(|(name, windows)| format!("- {}: {}", name, windows.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn availability_week_lines(rows: &[serde_json::Value]) -> String {
    rows.iter()
        .map(|row| {
            let day = row_str(row, "day").unwrap_or("?");
            if row.get("is_off").and_then(serde_json::Value::as_bool) == Some(true) {
                format!("- {day}: off")
            } else {
                format!("- {day}: {}", row_window(row))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn assignment_lines(rows: &[serde_json::Value]) -> String {
    rows.iter()
        .map(|row| {
            let day = row_str(row, "day").unwrap_or("?");
            let mut line = format!("- {day} {}", row_window(row));
            if let Some(role) = row_str(row, "work_type") {
                line.push_str(&format!(" ({role})"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn who_works_lines(rows: &[serde_json::Value]) -> String {
    rows.iter()
        .map(|row| {
            let mut line = format!("- {}: {}", display_name(row), row_window(row));
            if let Some(role) = row_str(row, "work_type") {
                line.push_str(&format!(" ({role})"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn gap_lines(rows: &[serde_json::Value]) -> String {
    rows.iter()
        .map(|row| {
            let day = row_str(row, "day").unwrap_or("?");
            let open = row_i64(row, "duration_minutes").unwrap_or(0);
            match row_str(row, "work_type") {
                Some(role) => format!(
                    "- {day} {} ({role}, {} open)",
                    row_window(row),
                    render_duration(open as i32)
                ),
                None => format!(
                    "- {day} {} ({} open)",
                    row_window(row),
                    render_duration(open as i32)
                ),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn minutes_lines(rows: &[serde_json::Value]) -> String {
    rows.iter()
        .map(|row| {
            let minutes = row_i64(row, "minutes").unwrap_or(0);
            format!("- {}: {}", display_name(row), render_duration(minutes as i32))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn display_name(row: &serde_json::Value) -> String {
    row_str(row, "employee_name")
        .or_else(|| row_str(row, "employee_id"))
        .unwrap_or("unknown")
        .to_string()
}

fn row_window(row: &serde_json::Value) -> String {
    let start = row_i64(row, "start_minute").unwrap_or(0);
    let end = row_i64(row, "end_minute").unwrap_or(0);
    format!("{}-{}", render_clock(start as i32), render_clock(end as i32))
}

fn signed_duration(minutes: i64) -> String {
    if minutes < 0 {
        format!("-{}", render_duration(-minutes as i32))
    } else {
        format!("+{}", render_duration(minutes as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::SourceRead;
    use rota_core::query::{ClarificationKind, ClarificationRequest};
    use rota_core::thread::ClarificationOption;
    use serde_json::json;

    fn single_store_scope() -> ResolvedScope {
        ResolvedScope::single_store("st-1".to_string(), ScopeMode::HomeOnly)
    }

    #[test]
    fn scope_bands_per_mode() {
        assert_eq!(scope_band(&single_store_scope()), "Scope: this store only");

        let all = ResolvedScope {
            primary_store_id: "st-1".to_string(),
            mode: ScopeMode::AllManaged,
            store_ids: vec!["st-1".to_string(), "st-2".to_string(), "st-3".to_string()],
        };
        assert_eq!(scope_band(&all), "Scope: all managed stores (3)");
    }

    #[test]
    fn hours_rows_render_durations_and_shortfall() {
        let rows = vec![json!({
            "employee_name": "Anna Peeters",
            "scheduled_minutes": 1900,
            "target_minutes": 2280,
            "shortfall_minutes": 380,
        })];
        assert_eq!(
            hours_lines(&rows, None),
            "- Anna Peeters: 31h40 scheduled (target 38h00)"
        );
        assert_eq!(
            hours_lines(&rows, Some(("shortfall_minutes", "under"))),
            "- Anna Peeters: 31h40 scheduled (target 38h00), 6h20 under target"
        );
    }

    #[test]
    fn availability_windows_group_per_employee() {
        let rows = vec![
            json!({"employee_name": "Anna Peeters", "start_minute": 480, "end_minute": 720}),
            json!({"employee_name": "Anna Peeters", "start_minute": 960, "end_minute": 1200}),
            json!({"employee_name": "Bob Smith", "start_minute": 480, "end_minute": 720}),
        ];
        assert_eq!(
            availability_day_lines(&rows),
            "- Anna Peeters: 08:00-12:00, 16:00-20:00\n- Bob Smith: 08:00-12:00"
        );
    }

    #[test]
    fn compare_lines_carry_a_signed_delta() {
        let rows = vec![
            json!({"employee_name": "Anna Peeters", "minutes_a": 1800, "minutes_b": 2040,
                   "delta_minutes": 240}),
            json!({"employee_name": "Bob Smith", "minutes_a": 2100, "minutes_b": 2070,
                   "delta_minutes": -30}),
        ];
        let body = adhoc_body("compare_weeks", &rows);
        assert!(body.contains("- Anna Peeters: 34h00 vs 30h00 (+4h00)"));
        assert!(body.contains("- Bob Smith: 34h30 vs 35h00 (-0h30)"));
    }

    #[test]
    fn full_reply_ends_with_both_bands() {
        let outcome = ToolOutcome::Metric {
            metric: "hours_for_week".to_string(),
            rows: vec![json!({
                "employee_name": "Anna Peeters",
                "scheduled_minutes": 1900,
                "target_minutes": 2280,
            })],
            sources: vec![SourceRead::for_week(
                "employee_hours_by_week",
                "2025-W43".parse().expect("valid week"),
                1,
            )],
        };
        let reply = render_reply(&outcome, &single_store_scope());
        assert!(reply.starts_with("- Anna Peeters: 31h40 scheduled"));
        assert!(reply.contains("\n\nScope: this store only\n"));
        assert!(reply.ends_with("Sources: employee_hours_by_week (week 2025-W43, 1 row)"));
    }

    #[test]
    fn clarification_reply_lists_options_and_no_sources() {
        let outcome = ToolOutcome::Clarification(ClarificationRequest {
            kind: ClarificationKind::Employee,
            message: "I found more than one \"bob\". Which one do you mean?".to_string(),
            options: vec![
                ClarificationOption {
                    id: "emp-1".to_string(),
                    label: "Bob Smith".to_string(),
                },
                ClarificationOption {
                    id: "emp-2".to_string(),
                    label: "Bob Vandenberg".to_string(),
                },
            ],
        });
        let reply = render_reply(&outcome, &single_store_scope());
        assert!(reply.contains("1. Bob Smith"));
        assert!(reply.contains("2. Bob Vandenberg"));
        assert!(reply.ends_with("Sources: none (no data read)"));
    }
}
