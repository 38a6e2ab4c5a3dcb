use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ParseError;

/// How wide a conversation's queries reach across the manager's stores.
/// Persisted per thread and applied to every turn until changed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
    /// Only the thread's primary store.
    HomeOnly,
    /// Every store the manager owns.
    #[default]
    AllManaged,
    /// The primary store plus an explicit extra set.
    Specific,
}

impl ScopeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeMode::HomeOnly => "home_only",
            ScopeMode::AllManaged => "all_managed",
            ScopeMode::Specific => "specific",
        }
    }
}

impl FromStr for ScopeMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home_only" => Ok(ScopeMode::HomeOnly),
            "all_managed" => Ok(ScopeMode::AllManaged),
            "specific" => Ok(ScopeMode::Specific),
            other => Err(ParseError::InvalidScopeMode(other.to_string())),
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The store set a turn is authorized to read. Recomputed from the directory
/// on every turn, never cached across turns, so ownership changes take effect
/// immediately.
///
/// Invariant: `store_ids` is non-empty and starts with `primary_store_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    pub primary_store_id: String,
    pub mode: ScopeMode,
    pub store_ids: Vec<String>,
}

impl ResolvedScope {
    pub fn single_store(primary_store_id: String, mode: ScopeMode) -> Self {
        ResolvedScope {
            store_ids: vec![primary_store_id.clone()],
            primary_store_id,
            mode,
        }
    }

    /// Authorized stores other than the primary: candidates for borrowing
    /// cross-store-enabled employees.
    pub fn borrowable_ids(&self) -> Vec<String> {
        self.store_ids
            .iter()
            .filter(|id| **id != self.primary_store_id)
            .cloned()
            .collect()
    }

    pub fn is_single_store(&self) -> bool {
        self.store_ids.len() == 1
    }

    pub fn includes(&self, store_id: &str) -> bool {
        self.store_ids.iter().any(|id| id == store_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_strings_round_trip() {
        for mode in [ScopeMode::HomeOnly, ScopeMode::AllManaged, ScopeMode::Specific] {
            assert_eq!(mode.as_str().parse::<ScopeMode>().expect("parses"), mode);
        }
        "everything".parse::<ScopeMode>().expect_err("unknown mode");
    }

    #[test]
    fn default_mode_is_all_managed() {
        assert_eq!(ScopeMode::default(), ScopeMode::AllManaged);
    }

    #[test]
    fn borrowable_excludes_primary() {
        let scope = ResolvedScope {
            primary_store_id: "st-1".to_string(),
            mode: ScopeMode::AllManaged,
            store_ids: vec!["st-1".to_string(), "st-2".to_string(), "st-3".to_string()],
        };
        assert_eq!(scope.borrowable_ids(), vec!["st-2", "st-3"]);
        assert!(!scope.is_single_store());
        assert!(scope.includes("st-2"));
        assert!(!scope.includes("st-9"));
    }
}
