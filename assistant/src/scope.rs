//! Per-turn scope resolution. The thread states a mode; the directory says
//! which stores the manager actually owns right now. Recomputing on every
//! turn means an ownership change lands on the very next message.

use rota_core::scope::{ResolvedScope, ScopeMode};
use rota_core::thread::ThreadContext;

use crate::error::AssistantError;
use crate::store::DirectoryStore;

/// A resolved scope plus how many ownership rows backed it, for source
/// reporting on scope-change turns.
#[derive(Debug, Clone)]
pub struct ScopeResolution {
    pub scope: ResolvedScope,
    pub stores_read: usize,
}

pub async fn resolve_scope(
    directory: &dyn DirectoryStore,
    context: &ThreadContext,
) -> Result<ScopeResolution, AssistantError> {
    let primary = context.primary_store_id.clone();

    if context.scope_mode == ScopeMode::HomeOnly {
        return Ok(ScopeResolution {
            scope: ResolvedScope::single_store(primary, ScopeMode::HomeOnly),
            stores_read: 0,
        });
    }

    let owned = directory.stores_for_manager(&context.manager_id).await?;
    if owned.is_empty() {
        // Unknown or orphaned manager identity: degrade instead of failing
        // the turn.
        tracing::warn!(
            manager_id = %context.manager_id,
            "manager owns no stores, degrading to single-store scope"
        );
        return Ok(ScopeResolution {
            scope: ResolvedScope::single_store(primary, ScopeMode::HomeOnly),
            stores_read: 0,
        });
    }
    let stores_read = owned.len();

    let mut store_ids = vec![primary.clone()];
    if context.scope_mode == ScopeMode::Specific {
        for extra in &context.extra_store_ids {
            if *extra == primary || store_ids.contains(extra) {
                continue;
            }
            if owned.iter().any(|store| &store.id == extra) {
                store_ids.push(extra.clone());
            } else {
                tracing::warn!(store_id = %extra, "dropping unowned store from scope");
            }
        }
    } else {
        for store in &owned {
            if store.id != primary {
                store_ids.push(store.id.clone());
            }
        }
    }

    Ok(ScopeResolution {
        scope: ResolvedScope {
            primary_store_id: primary,
            mode: context.scope_mode,
            store_ids,
        },
        stores_read,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDirectory;
    use rota_core::IsoWeek;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with_store("st-1", "Centrum", "mgr-1")
            .with_store("st-2", "Noord", "mgr-1")
            .with_store("st-3", "Zuid", "mgr-1")
            .with_store("st-9", "Elders", "mgr-2")
    }

    fn context(mode: ScopeMode) -> ThreadContext {
        let mut context = ThreadContext::new(
            "th-1".to_string(),
            "mgr-1".to_string(),
            "st-1".to_string(),
            IsoWeek::current(),
        );
        context.scope_mode = mode;
        context
    }

    #[tokio::test]
    async fn home_only_never_reads_the_directory() {
        let resolution = resolve_scope(&directory(), &context(ScopeMode::HomeOnly))
            .await
            .expect("resolves");
        assert_eq!(resolution.scope.store_ids, vec!["st-1"]);
        assert_eq!(resolution.stores_read, 0);
    }

    #[tokio::test]
    async fn all_managed_includes_every_owned_store_primary_first() {
        let resolution = resolve_scope(&directory(), &context(ScopeMode::AllManaged))
            .await
            .expect("resolves");
        assert_eq!(resolution.scope.store_ids[0], "st-1");
        assert_eq!(resolution.scope.store_ids.len(), 3);
        assert!(resolution.scope.includes("st-2"));
        assert!(resolution.scope.includes("st-3"));
        assert!(!resolution.scope.includes("st-9"));
    }

    #[tokio::test]
    async fn specific_scope_drops_stores_the_manager_does_not_own() {
        let mut context = context(ScopeMode::Specific);
        context.extra_store_ids = vec!["st-2".to_string(), "st-9".to_string()];
        let resolution = resolve_scope(&directory(), &context).await.expect("resolves");
        assert_eq!(resolution.scope.store_ids, vec!["st-1", "st-2"]);
    }

    #[tokio::test]
    async fn unknown_manager_degrades_to_single_store() {
        let mut context = context(ScopeMode::AllManaged);
        context.manager_id = "mgr-nobody".to_string();
        let resolution = resolve_scope(&directory(), &context).await.expect("resolves");
        assert_eq!(resolution.scope.store_ids, vec!["st-1"]);
        assert_eq!(resolution.scope.mode, ScopeMode::HomeOnly);
    }
}
