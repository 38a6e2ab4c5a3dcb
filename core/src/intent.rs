use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::isoweek::IsoWeek;
use crate::scope::ScopeMode;
use crate::time::TimeWindow;
use crate::weekday::Weekday;

/// Everything a manager can ask for, as a closed set. The classifier maps
/// free text onto one of these; downstream routing is an exhaustive match,
/// so adding an intent is a compile-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    HoursForEmployee,
    HoursTopN,
    HoursUnderTarget,
    HoursOverTarget,
    AvailabilityOnDay,
    AvailabilityForEmployee,
    ScheduleForEmployee,
    WhoWorksOnDay,
    CoverageGaps,
    BiggestGap,
    CompareWeeks,
    SuggestCoverage,
    ScopeChange,
    Clarify,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 15] = [
        Intent::HoursForEmployee,
        Intent::HoursTopN,
        Intent::HoursUnderTarget,
        Intent::HoursOverTarget,
        Intent::AvailabilityOnDay,
        Intent::AvailabilityForEmployee,
        Intent::ScheduleForEmployee,
        Intent::WhoWorksOnDay,
        Intent::CoverageGaps,
        Intent::BiggestGap,
        Intent::CompareWeeks,
        Intent::SuggestCoverage,
        Intent::ScopeChange,
        Intent::Clarify,
        Intent::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::HoursForEmployee => "hours-for-employee",
            Intent::HoursTopN => "hours-top-n",
            Intent::HoursUnderTarget => "hours-under-target",
            Intent::HoursOverTarget => "hours-over-target",
            Intent::AvailabilityOnDay => "availability-on-day",
            Intent::AvailabilityForEmployee => "availability-for-employee",
            Intent::ScheduleForEmployee => "schedule-for-employee",
            Intent::WhoWorksOnDay => "who-works-on-day",
            Intent::CoverageGaps => "coverage-gaps",
            Intent::BiggestGap => "biggest-gap",
            Intent::CompareWeeks => "compare-weeks",
            Intent::SuggestCoverage => "suggest-coverage",
            Intent::ScopeChange => "scope-change",
            Intent::Clarify => "clarify",
            Intent::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Which week a question refers to, relative to the thread's current week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "week", rename_all = "snake_case")]
pub enum WeekRef {
    This,
    Last,
    Next,
    Explicit(IsoWeek),
}

impl WeekRef {
    pub fn resolve(self, current: IsoWeek) -> IsoWeek {
        match self {
            WeekRef::This => current,
            WeekRef::Last => current.shift(-1),
            WeekRef::Next => current.shift(1),
            WeekRef::Explicit(week) => week,
        }
    }
}

/// Classifier output for one message: the intent plus whatever entities the
/// text surface carried. Serializable because a pending clarification stores
/// the original question verbatim for resumption on the next turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedIntent {
    pub intent: Intent,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<WeekRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_mode: Option<ScopeMode>,
}

impl ExtractedIntent {
    pub fn new(intent: Intent, confidence: Confidence) -> Self {
        ExtractedIntent {
            intent,
            confidence,
            employee_text: None,
            work_type_text: None,
            day: None,
            window: None,
            week: None,
            top_n: None,
            scope_mode: None,
        }
    }

    /// The do-not-understand fallback every classifier degrades to.
    pub fn unknown() -> Self {
        Self::new(Intent::Unknown, Confidence::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_tags_match_wire_names() {
        let json = serde_json::to_string(&Intent::HoursTopN).expect("serializes");
        assert_eq!(json, "\"hours-top-n\"");
        for intent in Intent::ALL {
            let wire = serde_json::to_string(&intent).expect("serializes");
            assert_eq!(wire, format!("\"{}\"", intent.as_str()));
        }
    }

    #[test]
    fn week_refs_resolve_relative_to_current() {
        let current: IsoWeek = "2025-W10".parse().expect("valid week");
        assert_eq!(WeekRef::This.resolve(current), current);
        assert_eq!(WeekRef::Last.resolve(current).to_string(), "2025-W09");
        assert_eq!(WeekRef::Next.resolve(current).to_string(), "2025-W11");
        let explicit: IsoWeek = "2024-W02".parse().expect("valid week");
        assert_eq!(WeekRef::Explicit(explicit).resolve(current), explicit);
    }

    #[test]
    fn extracted_intent_round_trips_through_json() {
        let mut extracted = ExtractedIntent::new(Intent::AvailabilityOnDay, Confidence::High);
        extracted.day = Some(Weekday::Fri);
        extracted.window = TimeWindow::new(480, 720).ok();
        extracted.week = Some(WeekRef::Next);

        let json = serde_json::to_value(&extracted).expect("serializes");
        let back: ExtractedIntent = serde_json::from_value(json).expect("deserializes");
        assert_eq!(back, extracted);
    }
}
