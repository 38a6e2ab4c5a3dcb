use async_trait::async_trait;
use sqlx::PgPool;

use rota_core::thread::{ThreadContext, ThreadState};

use crate::error::AssistantError;

/// Durable per-thread state. One row per conversation, read at turn start,
/// written at turn end. Saves are plain upserts: the last writer wins, and
/// two genuinely concurrent turns on one thread can lose an update.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn load(&self, thread_id: &str) -> Result<Option<ThreadContext>, AssistantError>;
    async fn save(&self, context: &ThreadContext) -> Result<(), AssistantError>;
}

pub struct PgThreadStore {
    pool: PgPool,
}

impl PgThreadStore {
    pub fn new(pool: PgPool) -> Self {
        PgThreadStore { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ThreadRow {
    thread_id: String,
    manager_id: String,
    primary_store_id: String,
    iso_week: String,
    scope_mode: String,
    extra_store_ids: Vec<String>,
    state: serde_json::Value,
}

impl ThreadRow {
    fn into_context(self) -> Result<ThreadContext, AssistantError> {
        let iso_week = self
            .iso_week
            .parse()
            .map_err(|err| AssistantError::State(format!("stored week: {err}")))?;
        let scope_mode = self
            .scope_mode
            .parse()
            .map_err(|err| AssistantError::State(format!("stored scope: {err}")))?;
        let state: ThreadState = serde_json::from_value(self.state)
            .map_err(|err| AssistantError::State(format!("stored state: {err}")))?;

        Ok(ThreadContext {
            thread_id: self.thread_id,
            manager_id: self.manager_id,
            primary_store_id: self.primary_store_id,
            iso_week,
            scope_mode,
            extra_store_ids: self.extra_store_ids,
            state,
        })
    }
}

#[async_trait]
impl ThreadStore for PgThreadStore {
    async fn load(&self, thread_id: &str) -> Result<Option<ThreadContext>, AssistantError> {
        let row: Option<ThreadRow> = sqlx::query_as(
            r#"
            SELECT thread_id, manager_id, primary_store_id, iso_week,
                   scope_mode, extra_store_ids, state
            FROM assistant_threads
            WHERE thread_id = $1
            "#,
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ThreadRow::into_context).transpose()
    }

    async fn save(&self, context: &ThreadContext) -> Result<(), AssistantError> {
        let state = serde_json::to_value(&context.state)?;

        sqlx::query(
            r#"
            INSERT INTO assistant_threads
                (thread_id, manager_id, primary_store_id, iso_week,
                 scope_mode, extra_store_ids, state, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            ON CONFLICT (thread_id) DO UPDATE SET
                manager_id = EXCLUDED.manager_id,
                primary_store_id = EXCLUDED.primary_store_id,
                iso_week = EXCLUDED.iso_week,
                scope_mode = EXCLUDED.scope_mode,
                extra_store_ids = EXCLUDED.extra_store_ids,
                state = EXCLUDED.state,
                updated_at = now()
            "#,
        )
        .bind(&context.thread_id)
        .bind(&context.manager_id)
        .bind(&context.primary_store_id)
        .bind(context.iso_week.to_string())
        .bind(context.scope_mode.as_str())
        .bind(&context.extra_store_ids)
        .bind(state)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
