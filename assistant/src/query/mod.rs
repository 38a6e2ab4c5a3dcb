//! Safe query execution. Catalog metrics and ad-hoc statements both end
//! here: scope values are injected, templates render to positional binds,
//! the backend fetches JSON rows and every run comes back with the
//! [`SourceRead`] the reply must cite.

pub mod adhoc;
pub mod backend;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use adhoc::{AdHocQuery, ADHOC_ROW_CAP};
pub use backend::{PgQueryBackend, QueryBackend, StaticQueryBackend};

use rota_core::IsoWeek;

use crate::catalog::{template, MetricCatalog, ParamValue};
use crate::error::AssistantError;
use crate::outcome::SourceRead;

/// Values injected into every statement from the resolved scope. Templates
/// reference them as `{store_ids}` and `{iso_week}` without declaring them.
#[derive(Debug, Clone)]
pub struct ScopeParams {
    pub store_ids: Vec<String>,
    pub iso_week: IsoWeek,
}

impl ScopeParams {
    pub fn new(store_ids: Vec<String>, iso_week: IsoWeek) -> Self {
        ScopeParams { store_ids, iso_week }
    }

    /// Caller-supplied values win; scope fills the rest.
    fn inject(&self, values: &mut BTreeMap<String, ParamValue>) {
        values
            .entry("store_ids".to_string())
            .or_insert_with(|| ParamValue::TextArray(self.store_ids.clone()));
        values
            .entry("iso_week".to_string())
            .or_insert_with(|| ParamValue::Text(self.iso_week.to_string()));
    }
}

#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub rows: Vec<serde_json::Value>,
    pub source: SourceRead,
}

/// JSON-row field helpers shared by everything consuming backend rows.
pub(crate) fn row_str<'a>(row: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    row.get(key).and_then(serde_json::Value::as_str)
}

pub(crate) fn row_i64(row: &serde_json::Value, key: &str) -> Option<i64> {
    row.get(key).and_then(serde_json::Value::as_i64)
}

pub struct QueryExecutor {
    backend: Arc<dyn QueryBackend>,
    catalog: Arc<MetricCatalog>,
}

impl QueryExecutor {
    pub fn new(backend: Arc<dyn QueryBackend>, catalog: Arc<MetricCatalog>) -> Self {
        QueryExecutor { backend, catalog }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Runs one catalog metric. Required parameters are checked by name up
    /// front so the caller gets a "missing parameter" error naming the
    /// metric, not a render failure.
    pub async fn run_metric(
        &self,
        name: &str,
        params: BTreeMap<String, ParamValue>,
        scope: &ScopeParams,
    ) -> Result<QueryOutput, AssistantError> {
        let metric = self
            .catalog
            .get(name)
            .ok_or_else(|| AssistantError::validation(format!("unknown metric '{name}'")))?;
        for spec in &metric.params {
            if spec.required && !params.contains_key(spec.name) {
                return Err(AssistantError::validation_field(
                    format!("metric '{name}' requires parameter '{}'", spec.name),
                    spec.name,
                ));
            }
        }

        let mut values = params;
        scope.inject(&mut values);
        let rendered = metric.template.render(&values).map_err(|error| {
            AssistantError::Template {
                name: name.to_string(),
                reason: error.to_string(),
            }
        })?;

        let rows = self.backend.fetch_rows(&rendered.sql, &rendered.binds).await?;
        tracing::debug!(metric = name, rows = rows.len(), "metric executed");

        let weeks = if metric.week_scoped() {
            vec![scope.iso_week]
        } else {
            Vec::new()
        };
        let row_count = rows.len();
        Ok(QueryOutput {
            rows,
            source: SourceRead {
                view: metric.view.to_string(),
                weeks,
                row_count,
            },
        })
    }

    /// Runs one composite statement through the ad-hoc screen, guard
    /// injection and the same template renderer as the catalog.
    pub async fn run_adhoc(
        &self,
        query: AdHocQuery,
        scope: &ScopeParams,
    ) -> Result<QueryOutput, AssistantError> {
        adhoc::validate(&query.sql)?;
        let guarded = adhoc::inject_guards(&query.sql);

        let allowed: Vec<&str> = query
            .params
            .iter()
            .map(|spec| spec.name)
            .chain(crate::catalog::AUTO_PARAMS)
            .collect();
        let compiled = template::compile(&guarded, &allowed).map_err(|error| {
            AssistantError::Template {
                name: query.name.to_string(),
                reason: error.to_string(),
            }
        })?;

        let mut values = query.values;
        scope.inject(&mut values);
        let rendered = compiled.render(&values).map_err(|error| AssistantError::Template {
            name: query.name.to_string(),
            reason: error.to_string(),
        })?;

        let rows = self.backend.fetch_rows(&rendered.sql, &rendered.binds).await?;
        tracing::debug!(query = query.name, rows = rows.len(), "ad-hoc query executed");

        let weeks = if !query.weeks.is_empty() {
            query.weeks
        } else if compiled.placeholders().contains(&"iso_week") {
            vec![scope.iso_week]
        } else {
            Vec::new()
        };
        let row_count = rows.len();
        Ok(QueryOutput {
            rows,
            source: SourceRead {
                view: query.view.to_string(),
                weeks,
                row_count,
            },
        })
    }
}
