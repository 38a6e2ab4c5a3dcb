//! The stricter path for the two composite reads that do not fit the
//! catalog shape: week-over-week comparison and the biggest-gap day. These
//! statements go through the same placeholder machinery as catalog metrics,
//! but are additionally screened as raw SQL first and get scope, week and
//! row-cap guards injected when a statement lacks them.

use std::collections::BTreeMap;

use rota_core::IsoWeek;

use crate::catalog::{ParamSpec, ParamType, ParamValue, VIEW_ASSIGNMENTS, VIEW_HOURS,
    WHITELISTED_VIEWS};
use crate::error::AssistantError;

/// Hard row cap appended to any ad-hoc statement without its own LIMIT.
pub const ADHOC_ROW_CAP: usize = 200;

const MUTATING_KEYWORDS: [&str; 11] = [
    "insert", "update", "delete", "drop", "alter", "create", "truncate", "grant", "revoke",
    "copy", "merge",
];

/// Per-employee minute totals for two weeks side by side, biggest gain
/// first. `week_b` is the anchor week, `week_a` the one compared against.
const COMPARE_WEEKS_SQL: &str = "SELECT employee_id, employee_name, \
     sum(CASE WHEN iso_week = {week_a} THEN scheduled_minutes ELSE 0 END) AS minutes_a, \
     sum(CASE WHEN iso_week = {week_b} THEN scheduled_minutes ELSE 0 END) AS minutes_b, \
     sum(CASE WHEN iso_week = {week_b} THEN scheduled_minutes ELSE -scheduled_minutes END) \
     AS delta_minutes \
     FROM employee_hours_by_week \
     WHERE store_id = ANY({store_ids}) AND iso_week IN ({week_a}, {week_b}) \
     GROUP BY employee_id, employee_name \
     ORDER BY delta_minutes DESC, employee_name";

const BIGGEST_GAP_SQL: &str = "SELECT day, sum(duration_minutes)::bigint AS open_minutes, \
     count(*) AS open_slots \
     FROM day_assignments \
     WHERE store_id = ANY({store_ids}) AND iso_week = {iso_week} AND employee_id IS NULL \
     GROUP BY day \
     ORDER BY open_minutes DESC, day \
     LIMIT 1";

/// A composite statement plus everything the executor needs to run it.
#[derive(Debug, Clone)]
pub struct AdHocQuery {
    pub name: &'static str,
    pub view: &'static str,
    pub sql: String,
    pub params: Vec<ParamSpec>,
    pub values: BTreeMap<String, ParamValue>,
    /// Weeks the statement spans, for the source band. Empty means the
    /// statement runs on the scope's week.
    pub weeks: Vec<IsoWeek>,
}

impl AdHocQuery {
    pub fn compare_weeks(anchor: IsoWeek, other: IsoWeek) -> Self {
        let mut values = BTreeMap::new();
        values.insert("week_a".to_string(), ParamValue::Text(other.to_string()));
        values.insert("week_b".to_string(), ParamValue::Text(anchor.to_string()));
        AdHocQuery {
            name: "compare_weeks",
            view: VIEW_HOURS,
            sql: COMPARE_WEEKS_SQL.to_string(),
            params: vec![
                ParamSpec::required("week_a", ParamType::Text),
                ParamSpec::required("week_b", ParamType::Text),
            ],
            values,
            weeks: vec![anchor, other],
        }
    }

    pub fn biggest_gap() -> Self {
        AdHocQuery {
            name: "biggest_gap",
            view: VIEW_ASSIGNMENTS,
            sql: BIGGEST_GAP_SQL.to_string(),
            params: Vec::new(),
            values: BTreeMap::new(),
            weeks: Vec::new(),
        }
    }
}

/// Rejects anything that is not a single read over the whitelisted views.
pub fn validate(sql: &str) -> Result<(), AssistantError> {
    if sql.contains(';') {
        return Err(AssistantError::validation(
            "ad-hoc statements must not contain statement separators",
        ));
    }
    let words = sql_words(sql);
    match words.first().map(String::as_str) {
        Some("select") | Some("with") => {}
        _ => {
            return Err(AssistantError::validation(
                "ad-hoc statements must start with SELECT or WITH",
            ));
        }
    }
    for word in &words {
        if MUTATING_KEYWORDS.contains(&word.as_str()) {
            return Err(AssistantError::validation(format!(
                "ad-hoc statements must not contain '{word}'"
            )));
        }
    }
    for (index, word) in words.iter().enumerate() {
        if word != "from" && word != "join" {
            continue;
        }
        match words.get(index + 1).map(String::as_str) {
            // Subselects tokenize as "from select".
            Some("select") => {}
            Some(relation) if WHITELISTED_VIEWS.contains(&relation) => {}
            Some(relation) => {
                return Err(AssistantError::validation(format!(
                    "relation '{relation}' is not a whitelisted view"
                )));
            }
            None => {
                return Err(AssistantError::validation("dangling FROM clause"));
            }
        }
    }
    Ok(())
}

/// Adds the scope filter, the week filter and the row cap to a statement
/// missing them. The built-in statements already carry scope and week
/// placeholders, so this mostly tops up the LIMIT.
pub fn inject_guards(sql: &str) -> String {
    let mut guarded = sql.trim_end().to_string();
    let words = sql_words(&guarded);

    let mut missing = Vec::new();
    if !guarded.contains("{store_ids}") {
        missing.push("store_id = ANY({store_ids})");
    }
    let has_week = guarded.contains("{iso_week}")
        || guarded.contains("{week_a}")
        || guarded.contains("{week_b}");
    if !has_week {
        missing.push("iso_week = {iso_week}");
    }
    if !missing.is_empty() {
        let connective = if words.iter().any(|word| word == "where") {
            " AND "
        } else {
            " WHERE "
        };
        let clause = format!("{connective}{}", missing.join(" AND "));
        let at = tail_clause_offset(&guarded);
        guarded.insert_str(at, &clause);
    }

    if !words.iter().any(|word| word == "limit") {
        guarded.push_str(&format!(" LIMIT {ADHOC_ROW_CAP}"));
    }
    guarded
}

/// Where injected filters go: before the first GROUP BY / ORDER BY / LIMIT,
/// or at the end for a bare select.
fn tail_clause_offset(sql: &str) -> usize {
    let lowered = sql.to_ascii_lowercase();
    [" group by", " order by", " limit"]
        .iter()
        .filter_map(|marker| lowered.find(marker))
        .min()
        .unwrap_or(sql.len())
}

/// Lowercased alphanumeric/underscore runs; punctuation and placeholder
/// braces separate words.
fn sql_words(sql: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for ch in sql.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_statements_pass_validation() {
        let week_a: IsoWeek = "2025-W42".parse().expect("valid week");
        let week_b: IsoWeek = "2025-W43".parse().expect("valid week");
        validate(&AdHocQuery::compare_weeks(week_b, week_a).sql).expect("compare passes");
        validate(&AdHocQuery::biggest_gap().sql).expect("gap passes");
    }

    #[test]
    fn mutating_statements_are_rejected() {
        validate("DELETE FROM day_assignments").expect_err("delete rejected");
        validate("SELECT day FROM day_assignments; DROP TABLE stores")
            .expect_err("separator rejected");
        validate("UPDATE employee_hours_by_week SET scheduled_minutes = 0")
            .expect_err("update rejected");
        validate("EXPLAIN SELECT day FROM day_assignments").expect_err("non-select rejected");
    }

    #[test]
    fn unlisted_relations_are_rejected() {
        let error =
            validate("SELECT * FROM payroll_export").expect_err("raw table rejected");
        assert!(error.to_string().contains("payroll_export"));
        validate("SELECT * FROM day_assignments JOIN stores ON true")
            .expect_err("joined table rejected");
    }

    #[test]
    fn keywords_inside_identifiers_do_not_trip_the_screen() {
        validate("SELECT created_at FROM day_assignments")
            .expect("created_at must not read as CREATE");
    }

    #[test]
    fn guards_are_injected_only_when_missing() {
        let bare = inject_guards("SELECT day FROM day_assignments GROUP BY day");
        assert_eq!(
            bare,
            "SELECT day FROM day_assignments WHERE store_id = ANY({store_ids}) \
             AND iso_week = {iso_week} GROUP BY day LIMIT 200"
        );

        let compare = inject_guards(COMPARE_WEEKS_SQL);
        assert!(compare.ends_with("LIMIT 200"));
        assert_eq!(compare.matches("{store_ids}").count(), 1);

        let gap = inject_guards(BIGGEST_GAP_SQL);
        assert_eq!(gap, BIGGEST_GAP_SQL);
    }
}
