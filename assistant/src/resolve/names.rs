//! Employee name matching. Mentions are scored against the in-scope roster
//! on normalized text so casing and accents never change the outcome.

use strsim::normalized_levenshtein;

use rota_core::thread::ClarificationOption;

use crate::store::EmployeeRecord;
use crate::text::normalize;

pub const SCORE_EXACT: i32 = 100;
pub const SCORE_PREFIX: i32 = 90;
pub const SCORE_SUBSTRING: i32 = 80;
pub const FUZZY_WEIGHT: f64 = 70.0;
pub const FUZZY_MIN_SIMILARITY: f64 = 0.7;
pub const MAX_OPTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch {
    pub employee_id: String,
    pub employee_name: String,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NameResolution {
    /// Nothing in the roster came close; ask again without options.
    None,
    /// A single unambiguous hit.
    One(NameMatch),
    /// Competing hits, best first, capped at [`MAX_OPTIONS`].
    Many(Vec<NameMatch>),
}

/// Scores one mention against one full name. Zero means no match.
pub fn score_name(mention: &str, full_name: &str) -> i32 {
    if mention.is_empty() || full_name.is_empty() {
        return 0;
    }
    if full_name == mention {
        return SCORE_EXACT;
    }
    if full_name.starts_with(mention) || name_part_prefix(mention, full_name) {
        return SCORE_PREFIX;
    }
    if full_name.contains(mention) {
        return SCORE_SUBSTRING;
    }
    let similarity = normalized_levenshtein(mention, full_name);
    if similarity > FUZZY_MIN_SIMILARITY {
        (similarity * FUZZY_WEIGHT).round() as i32
    } else {
        0
    }
}

// "bob s" should rank as a prefix of "bob smith" even though the raw
// prefix test already covers it; this handles "smith" against "bob smith".
fn name_part_prefix(mention: &str, full_name: &str) -> bool {
    full_name
        .split_whitespace()
        .any(|part| part.starts_with(mention))
}

/// Matches a mention against the roster and folds the scored hits into a
/// resolution: zero hits, one winner, or a ranked shortlist.
pub fn match_employees(mention: &str, employees: &[EmployeeRecord]) -> NameResolution {
    let folded = normalize(mention);
    let mut matches: Vec<NameMatch> = employees
        .iter()
        .filter_map(|employee| {
            let score = score_name(&folded, &normalize(&employee.name));
            (score > 0).then(|| NameMatch {
                employee_id: employee.id.clone(),
                employee_name: employee.name.clone(),
                score,
            })
        })
        .collect();
    matches.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.employee_name.cmp(&b.employee_name))
    });
    matches.truncate(MAX_OPTIONS);
    match matches.len() {
        0 => NameResolution::None,
        1 => NameResolution::One(matches.remove(0)),
        _ => NameResolution::Many(matches),
    }
}

impl NameMatch {
    pub fn to_option(&self) -> ClarificationOption {
        ClarificationOption {
            id: self.employee_id.clone(),
            label: self.employee_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<EmployeeRecord> {
        ["Bob Smith", "Bob Jones", "Anna Peeters", "Annelies Van Dam", "Chloe Dubois"]
            .iter()
            .enumerate()
            .map(|(index, name)| EmployeeRecord {
                id: format!("emp-{index}"),
                name: (*name).to_owned(),
                home_store_id: "store-1".to_owned(),
                can_work_across_stores: false,
                weekly_minutes_target: 2280,
                role_ids: Vec::new(),
                role_names: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn exact_full_name_is_a_single_top_hit() {
        match match_employees("bob smith", &roster()) {
            NameResolution::One(hit) => {
                assert_eq!(hit.employee_name, "Bob Smith");
                assert_eq!(hit.score, SCORE_EXACT);
            }
            other => panic!("expected a single hit, got {other:?}"),
        }
    }

    #[test]
    fn shared_first_name_yields_ranked_options() {
        match match_employees("bob", &roster()) {
            NameResolution::Many(hits) => {
                assert_eq!(hits.len(), 2);
                assert_eq!(hits[0].score, SCORE_PREFIX);
                // Same score, so ties break alphabetically.
                assert_eq!(hits[0].employee_name, "Bob Jones");
                assert_eq!(hits[1].employee_name, "Bob Smith");
            }
            other => panic!("expected options, got {other:?}"),
        }
    }

    #[test]
    fn accents_and_case_never_matter() {
        match match_employees("Chloé DUBOIS", &roster()) {
            NameResolution::One(hit) => assert_eq!(hit.score, SCORE_EXACT),
            other => panic!("expected a single hit, got {other:?}"),
        }
    }

    #[test]
    fn one_typo_still_resolves() {
        // "peters" for "peeters": close enough for the fuzzy tier.
        match match_employees("anna peters", &roster()) {
            NameResolution::One(hit) => {
                assert_eq!(hit.employee_name, "Anna Peeters");
                assert!(hit.score > 0 && hit.score < SCORE_SUBSTRING);
            }
            other => panic!("expected a single hit, got {other:?}"),
        }
    }

    #[test]
    fn unknown_names_resolve_to_nothing() {
        assert_eq!(match_employees("zyx", &roster()), NameResolution::None);
    }

    #[test]
    fn surname_alone_matches_by_name_part() {
        match match_employees("dubois", &roster()) {
            NameResolution::One(hit) => {
                assert_eq!(hit.employee_name, "Chloe Dubois");
                assert_eq!(hit.score, SCORE_PREFIX);
            }
            other => panic!("expected a single hit, got {other:?}"),
        }
    }
}
