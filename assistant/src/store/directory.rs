use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AssistantError;

/// A store the manager owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub id: String,
    pub name: String,
}

/// An employee as the pipeline sees them: identity, home store, borrowing
/// flag, weekly target and their qualified work types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub id: String,
    pub name: String,
    pub home_store_id: String,
    /// Whether this employee may cover shifts outside their home store.
    pub can_work_across_stores: bool,
    pub weekly_minutes_target: i32,
    pub role_ids: Vec<String>,
    pub role_names: Vec<String>,
}

impl EmployeeRecord {
    /// Case/accent-insensitive role check by name. Cross-store matching runs
    /// on names because work-type ids are store-local.
    pub fn has_role_named(&self, normalized_name: &str) -> bool {
        self.role_names
            .iter()
            .any(|role| crate::text::normalize(role) == normalized_name)
    }

    pub fn has_role_id(&self, work_type_id: &str) -> bool {
        self.role_ids.iter().any(|id| id == work_type_id)
    }
}

/// A work type (role) offered at one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkTypeRecord {
    pub id: String,
    pub store_id: String,
    pub name: String,
}

/// Read access to the ownership tables: who manages which stores, who works
/// there, which roles exist. Everything the scope resolver and the entity
/// resolver need, nothing more.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn stores_for_manager(
        &self,
        manager_id: &str,
    ) -> Result<Vec<StoreRecord>, AssistantError>;

    /// Employees whose home store is in `store_ids`, sorted by name.
    async fn employees_in_stores(
        &self,
        store_ids: &[String],
    ) -> Result<Vec<EmployeeRecord>, AssistantError>;

    async fn work_types_in_stores(
        &self,
        store_ids: &[String],
    ) -> Result<Vec<WorkTypeRecord>, AssistantError>;
}

pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        PgDirectoryStore { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: String,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    name: String,
    home_store_id: String,
    can_work_across_stores: bool,
    weekly_minutes_target: i32,
    role_ids: Vec<String>,
    role_names: Vec<String>,
}

impl EmployeeRow {
    fn into_record(self) -> EmployeeRecord {
        EmployeeRecord {
            id: self.id,
            name: self.name,
            home_store_id: self.home_store_id,
            can_work_across_stores: self.can_work_across_stores,
            weekly_minutes_target: self.weekly_minutes_target,
            role_ids: self.role_ids,
            role_names: self.role_names,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WorkTypeRow {
    id: String,
    store_id: String,
    name: String,
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn stores_for_manager(
        &self,
        manager_id: &str,
    ) -> Result<Vec<StoreRecord>, AssistantError> {
        let rows: Vec<StoreRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.name
            FROM stores s
            JOIN store_managers sm ON sm.store_id = s.id
            WHERE sm.manager_id = $1
            ORDER BY s.name, s.id
            "#,
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StoreRecord {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn employees_in_stores(
        &self,
        store_ids: &[String],
    ) -> Result<Vec<EmployeeRecord>, AssistantError> {
        let rows: Vec<EmployeeRow> = sqlx::query_as(
            r#"
            SELECT e.id, e.name, e.home_store_id, e.can_work_across_stores,
                   e.weekly_minutes_target,
                   coalesce(array_agg(wt.id) FILTER (WHERE wt.id IS NOT NULL), '{}') AS role_ids,
                   coalesce(array_agg(wt.name) FILTER (WHERE wt.id IS NOT NULL), '{}') AS role_names
            FROM employees e
            LEFT JOIN employee_roles er ON er.employee_id = e.id
            LEFT JOIN work_types wt ON wt.id = er.work_type_id
            WHERE e.home_store_id = ANY($1)
            GROUP BY e.id, e.name, e.home_store_id, e.can_work_across_stores,
                     e.weekly_minutes_target
            ORDER BY e.name, e.id
            "#,
        )
        .bind(store_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EmployeeRow::into_record).collect())
    }

    async fn work_types_in_stores(
        &self,
        store_ids: &[String],
    ) -> Result<Vec<WorkTypeRecord>, AssistantError> {
        let rows: Vec<WorkTypeRow> = sqlx::query_as(
            r#"
            SELECT id, store_id, name
            FROM work_types
            WHERE store_id = ANY($1)
            ORDER BY name, id
            "#,
        )
        .bind(store_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| WorkTypeRecord {
                id: row.id,
                store_id: row.store_id,
                name: row.name,
            })
            .collect())
    }
}
