//! Row fetching behind a trait so the executor, the suggestion engine and
//! the orchestrator can run against canned data in tests. The Postgres
//! implementation returns rows as JSON objects; formatting never needs
//! per-metric row structs that way.

use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::catalog::ParamValue;
use crate::error::AssistantError;

#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Runs a rendered statement and returns each row as a JSON object.
    async fn fetch_rows(
        &self,
        sql: &str,
        binds: &[ParamValue],
    ) -> Result<Vec<serde_json::Value>, AssistantError>;
}

pub struct PgQueryBackend {
    pool: PgPool,
}

impl PgQueryBackend {
    pub fn new(pool: PgPool) -> Self {
        PgQueryBackend { pool }
    }
}

#[async_trait]
impl QueryBackend for PgQueryBackend {
    async fn fetch_rows(
        &self,
        sql: &str,
        binds: &[ParamValue],
    ) -> Result<Vec<serde_json::Value>, AssistantError> {
        // One aggregate round trip; rendered statements carry explicit casts
        // on every bind, so inference inside the subquery is never an issue.
        let wrapped =
            format!("SELECT coalesce(jsonb_agg(to_jsonb(q)), '[]'::jsonb) FROM ({sql}) AS q");
        let mut query = sqlx::query_scalar::<_, serde_json::Value>(&wrapped);
        for bind in binds {
            query = match bind {
                ParamValue::Text(text) => query.bind(text.clone()),
                ParamValue::TextArray(items) => query.bind(items.clone()),
                ParamValue::Int(value) => query.bind(*value),
                ParamValue::Day(day) => query.bind(day.as_str().to_string()),
            };
        }
        let payload = query.fetch_one(&self.pool).await?;
        match payload {
            serde_json::Value::Array(rows) => Ok(rows),
            other => Err(AssistantError::Integrity(format!(
                "row aggregate came back as {other} instead of an array"
            ))),
        }
    }
}

/// Canned backend for tests. Statements are routed on the first registered
/// pattern they contain (normally a view name) and recorded for assertions.
pub struct StaticQueryBackend {
    routes: Vec<(String, Vec<serde_json::Value>)>,
    statements: RwLock<Vec<String>>,
}

impl StaticQueryBackend {
    pub fn new() -> Self {
        StaticQueryBackend {
            routes: Vec::new(),
            statements: RwLock::new(Vec::new()),
        }
    }

    pub fn with_view(mut self, pattern: &str, rows: Vec<serde_json::Value>) -> Self {
        self.routes.push((pattern.to_string(), rows));
        self
    }

    /// Every statement served so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.statements
            .read()
            .map(|served| served.clone())
            .unwrap_or_default()
    }
}

impl Default for StaticQueryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryBackend for StaticQueryBackend {
    async fn fetch_rows(
        &self,
        sql: &str,
        _binds: &[ParamValue],
    ) -> Result<Vec<serde_json::Value>, AssistantError> {
        let mut served = self
            .statements
            .write()
            .map_err(|err| AssistantError::State(err.to_string()))?;
        served.push(sql.to_string());
        for (pattern, rows) in &self.routes {
            if sql.contains(pattern.as_str()) {
                return Ok(rows.clone());
            }
        }
        Ok(Vec::new())
    }
}
