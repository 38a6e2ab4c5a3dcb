//! Entity resolution: turns the raw text entities a classifier extracted
//! into ids the query layer can bind, or decides the turn has to stop and
//! ask. Resolution only ever sees the roster already narrowed to the active
//! scope, so a name can never leak an out-of-scope employee.

pub mod days;
pub mod names;
pub mod windows;
pub mod work_types;

use std::collections::BTreeMap;

use rota_core::intent::{ExtractedIntent, Intent};
use rota_core::scope::ResolvedScope;
use rota_core::thread::ClarificationOption;
use rota_core::time::TimeWindow;
use rota_core::weekday::Weekday;
use rota_core::IsoWeek;

use crate::store::{EmployeeRecord, WorkTypeRecord};
use crate::text::normalize;
use names::NameResolution;
use work_types::ResolvedWorkType;

/// Everything a routed intent needs, fully resolved.
#[derive(Debug, Clone)]
pub struct ResolvedEntities {
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    /// Present when the message named a role, resolved or not.
    pub work_type: Option<ResolvedWorkType>,
    pub day: Option<Weekday>,
    pub window: Option<TimeWindow>,
    pub iso_week: IsoWeek,
    /// Set when this turn resolved a fresh mention worth remembering.
    pub remember_mention: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Ready(ResolvedEntities),
    Clarify(ClarificationNeed),
}

/// Why resolution stopped. Ambiguous employees and missing days become
/// pending state so the next message can answer in place; an unknown
/// employee only gets a re-ask, there is nothing to resume against.
#[derive(Debug, Clone)]
pub enum ClarificationNeed {
    EmployeeAmbiguous {
        mention: String,
        options: Vec<ClarificationOption>,
    },
    EmployeeUnknown {
        mention: String,
    },
    DayMissing,
}

/// Intents that cannot run without a concrete day.
fn requires_day(intent: Intent) -> bool {
    matches!(
        intent,
        Intent::AvailabilityOnDay | Intent::WhoWorksOnDay | Intent::SuggestCoverage
    )
}

/// Intents that cannot run without a concrete employee.
fn requires_employee(intent: Intent) -> bool {
    matches!(
        intent,
        Intent::HoursForEmployee | Intent::AvailabilityForEmployee | Intent::ScheduleForEmployee
    )
}

pub fn resolve_entities(
    question: &ExtractedIntent,
    scope: &ResolvedScope,
    current_week: IsoWeek,
    employees: &[EmployeeRecord],
    work_types: &[WorkTypeRecord],
    known_mentions: &BTreeMap<String, String>,
) -> Resolution {
    let iso_week = question
        .week
        .map(|week| week.resolve(current_week))
        .unwrap_or(current_week);

    let mut resolved = ResolvedEntities {
        employee_id: None,
        employee_name: None,
        work_type: None,
        day: question.day,
        window: question.window,
        iso_week,
        remember_mention: None,
    };

    if let Some(mention) = question.employee_text.as_deref() {
        match resolve_employee(mention, employees, known_mentions) {
            EmployeeLookup::Found { id, name, fresh } => {
                if fresh {
                    resolved.remember_mention = Some((normalize(mention), id.clone()));
                }
                resolved.employee_id = Some(id);
                resolved.employee_name = Some(name);
            }
            EmployeeLookup::Ambiguous(options) => {
                return Resolution::Clarify(ClarificationNeed::EmployeeAmbiguous {
                    mention: mention.to_owned(),
                    options,
                });
            }
            EmployeeLookup::Unknown => {
                return Resolution::Clarify(ClarificationNeed::EmployeeUnknown {
                    mention: mention.to_owned(),
                });
            }
        }
    } else if requires_employee(question.intent) {
        return Resolution::Clarify(ClarificationNeed::EmployeeUnknown {
            mention: String::new(),
        });
    }

    if let Some(mention) = question.work_type_text.as_deref() {
        resolved.work_type = Some(work_types::resolve_work_type(mention, work_types));
    }

    if resolved.day.is_none() && requires_day(question.intent) {
        return Resolution::Clarify(ClarificationNeed::DayMissing);
    }

    debug_assert!(!scope.store_ids.is_empty());
    Resolution::Ready(resolved)
}

enum EmployeeLookup {
    Found { id: String, name: String, fresh: bool },
    Ambiguous(Vec<ClarificationOption>),
    Unknown,
}

fn resolve_employee(
    mention: &str,
    employees: &[EmployeeRecord],
    known_mentions: &BTreeMap<String, String>,
) -> EmployeeLookup {
    let folded = normalize(mention);

    // A mention already pinned earlier in the thread stays pinned, as long
    // as that employee is still in scope.
    if let Some(id) = known_mentions.get(&folded) {
        if let Some(employee) = employees.iter().find(|employee| &employee.id == id) {
            return EmployeeLookup::Found {
                id: employee.id.clone(),
                name: employee.name.clone(),
                fresh: false,
            };
        }
    }

    match names::match_employees(mention, employees) {
        NameResolution::One(hit) => EmployeeLookup::Found {
            id: hit.employee_id,
            name: hit.employee_name,
            fresh: true,
        },
        NameResolution::Many(hits) => {
            EmployeeLookup::Ambiguous(hits.iter().map(names::NameMatch::to_option).collect())
        }
        NameResolution::None => EmployeeLookup::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::intent::Confidence;

    fn roster() -> Vec<EmployeeRecord> {
        [("emp-1", "Bob Smith"), ("emp-2", "Bob Jones"), ("emp-3", "Anna Peeters")]
            .iter()
            .map(|(id, name)| EmployeeRecord {
                id: (*id).to_owned(),
                name: (*name).to_owned(),
                home_store_id: "store-1".to_owned(),
                can_work_across_stores: false,
                weekly_minutes_target: 2280,
                role_ids: Vec::new(),
                role_names: Vec::new(),
            })
            .collect()
    }

    fn scope() -> ResolvedScope {
        ResolvedScope::single_store("store-1".to_owned(), rota_core::ScopeMode::HomeOnly)
    }

    fn week() -> IsoWeek {
        "2025-W10".parse().expect("valid week")
    }

    #[test]
    fn ambiguous_mention_stops_with_options() {
        let mut question = ExtractedIntent::new(Intent::HoursForEmployee, Confidence::High);
        question.employee_text = Some("bob".to_owned());

        let resolution =
            resolve_entities(&question, &scope(), week(), &roster(), &[], &BTreeMap::new());
        match resolution {
            Resolution::Clarify(ClarificationNeed::EmployeeAmbiguous { mention, options }) => {
                assert_eq!(mention, "bob");
                assert_eq!(options.len(), 2);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn known_mention_skips_matching_entirely() {
        let mut question = ExtractedIntent::new(Intent::HoursForEmployee, Confidence::High);
        question.employee_text = Some("Bob".to_owned());
        let mut known = BTreeMap::new();
        known.insert("bob".to_owned(), "emp-2".to_owned());

        let resolution = resolve_entities(&question, &scope(), week(), &roster(), &[], &known);
        match resolution {
            Resolution::Ready(entities) => {
                assert_eq!(entities.employee_id.as_deref(), Some("emp-2"));
                assert!(entities.remember_mention.is_none());
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn fresh_single_match_is_remembered() {
        let mut question = ExtractedIntent::new(Intent::HoursForEmployee, Confidence::High);
        question.employee_text = Some("Anna".to_owned());

        let resolution =
            resolve_entities(&question, &scope(), week(), &roster(), &[], &BTreeMap::new());
        match resolution {
            Resolution::Ready(entities) => {
                assert_eq!(entities.employee_id.as_deref(), Some("emp-3"));
                assert_eq!(
                    entities.remember_mention,
                    Some(("anna".to_owned(), "emp-3".to_owned()))
                );
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn day_bound_intents_stop_without_a_day() {
        let question = ExtractedIntent::new(Intent::SuggestCoverage, Confidence::High);
        let resolution =
            resolve_entities(&question, &scope(), week(), &roster(), &[], &BTreeMap::new());
        assert!(matches!(
            resolution,
            Resolution::Clarify(ClarificationNeed::DayMissing)
        ));
    }

    #[test]
    fn week_reference_shifts_the_resolved_week() {
        let mut question = ExtractedIntent::new(Intent::CoverageGaps, Confidence::High);
        question.week = Some(rota_core::intent::WeekRef::Last);

        let resolution =
            resolve_entities(&question, &scope(), week(), &roster(), &[], &BTreeMap::new());
        match resolution {
            Resolution::Ready(entities) => {
                assert_eq!(entities.iso_week.to_string(), "2025-W09");
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }
}
