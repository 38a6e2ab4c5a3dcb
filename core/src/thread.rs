use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::intent::ExtractedIntent;
use crate::isoweek::IsoWeek;
use crate::scope::ScopeMode;

/// One conversation with one manager. Loaded at the start of every turn,
/// written back at the end; there is no other cross-turn state anywhere in
/// the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadContext {
    pub thread_id: String,
    pub manager_id: String,
    /// The store the conversation is anchored to. Never empty.
    pub primary_store_id: String,
    pub iso_week: IsoWeek,
    pub scope_mode: ScopeMode,
    /// Extra stores for `ScopeMode::Specific`; ignored in other modes.
    pub extra_store_ids: Vec<String>,
    pub state: ThreadState,
}

impl ThreadContext {
    pub fn new(
        thread_id: String,
        manager_id: String,
        primary_store_id: String,
        iso_week: IsoWeek,
    ) -> Self {
        ThreadContext {
            thread_id,
            manager_id,
            primary_store_id,
            iso_week,
            scope_mode: ScopeMode::default(),
            extra_store_ids: Vec::new(),
            state: ThreadState::default(),
        }
    }
}

/// Durable per-thread conversational memory, stored as one JSON blob.
/// A BTreeMap keeps the serialized form stable for diffing in logs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreadState {
    /// Employee mentions resolved in earlier turns, normalized mention text
    /// to employee id. Lets "Bob" stay the same Bob for the whole thread.
    #[serde(default)]
    pub known_mentions: BTreeMap<String, String>,
    /// Set when a turn could not complete without more input; the next turn
    /// tries to resolve it before anything else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingClarification>,
    /// Free-form audit notes appended by the pipeline (scope changes and the
    /// like). Never interpreted, only surfaced for debugging.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// The clarification state machine: Idle is `None`, each variant is one kind
/// of Clarifying. The original question rides along so the resuming turn
/// does not re-classify the old message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingClarification {
    /// Several employees matched one mention; waiting for the manager to
    /// pick one of `options`.
    EmployeeChoice {
        mention: String,
        options: Vec<ClarificationOption>,
        question: ExtractedIntent,
    },
    /// The question needs a day and none was given.
    MissingDay { question: ExtractedIntent },
}

/// One pickable answer to a clarification question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClarificationOption {
    pub id: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Confidence, ExtractedIntent, Intent};

    #[test]
    fn state_serializes_pending_clarification_with_question() {
        let mut question = ExtractedIntent::new(Intent::HoursForEmployee, Confidence::High);
        question.employee_text = Some("bob".to_string());

        let mut state = ThreadState::default();
        state.pending = Some(PendingClarification::EmployeeChoice {
            mention: "bob".to_string(),
            options: vec![
                ClarificationOption {
                    id: "emp-1".to_string(),
                    label: "Bob Smith".to_string(),
                },
                ClarificationOption {
                    id: "emp-2".to_string(),
                    label: "Bob Jones".to_string(),
                },
            ],
            question,
        });
        state
            .known_mentions
            .insert("alice".to_string(), "emp-9".to_string());

        let json = serde_json::to_value(&state).expect("serializes");
        assert_eq!(json["pending"]["kind"], "employee_choice");
        let back: ThreadState = serde_json::from_value(json).expect("deserializes");
        assert_eq!(back, state);
    }

    #[test]
    fn empty_state_deserializes_from_empty_object() {
        let state: ThreadState = serde_json::from_str("{}").expect("deserializes");
        assert_eq!(state, ThreadState::default());
        assert!(state.pending.is_none());
    }
}
