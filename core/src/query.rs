use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::scope::ScopeMode;
use crate::thread::ClarificationOption;

/// One manager message entering the pipeline.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QueryRequest {
    /// The free-form question.
    pub message: String,
    /// Continue an existing conversation; omit to start a new thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// Caller identity. Over HTTP this is filled from the x-manager-id
    /// header by the route, not from the body.
    #[serde(default)]
    pub manager_id: String,
    /// Per-request context pinning, mainly for new threads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<QueryOverrides>,
}

/// Optional context a caller can pin instead of relying on defaults
/// (manager's first store, current ISO week, all-managed scope).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QueryOverrides {
    /// Primary store for the thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    /// Week the conversation is about, as `YYYY-Www`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_week: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeMode>,
    /// Extra stores for `scope = specific`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_store_ids: Option<Vec<String>>,
}

/// The pipeline's answer to one message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueryReply {
    /// Rendered answer, including the scope and source bands.
    pub text: String,
    /// What was read to produce the answer, e.g.
    /// `availability_by_day (7 rows)`. Empty only for clarification and
    /// error replies.
    pub sources: Vec<String>,
    /// Thread to send the follow-up to; generated when the request had none.
    pub thread_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_clarification: Option<ClarificationRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClarificationKind {
    /// Pick one of several matching employees.
    Employee,
    /// The question needs a day.
    Day,
    /// The message was not understood; rephrase.
    Question,
}

/// Ask-back payload when a turn cannot complete without more input.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClarificationRequest {
    #[serde(rename = "type")]
    pub kind: ClarificationKind,
    /// The question to show the manager.
    pub message: String,
    /// Ranked choices, best match first; empty when the answer is free-form
    /// (a day name, a rephrased question).
    pub options: Vec<ClarificationOption>,
}
