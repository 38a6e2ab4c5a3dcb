//! In-memory stores for tests and single-process embedding. Interchangeable
//! with the Postgres implementations through the store traits.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use rota_core::thread::ThreadContext;

use crate::error::AssistantError;
use crate::store::directory::{DirectoryStore, EmployeeRecord, StoreRecord, WorkTypeRecord};
use crate::store::threads::ThreadStore;

/// Fixed directory contents, built up-front. Reads only, so no locking.
#[derive(Default)]
pub struct InMemoryDirectory {
    stores: Vec<StoreRecord>,
    /// manager id -> ids of stores they manage
    managers: HashMap<String, Vec<String>>,
    employees: Vec<EmployeeRecord>,
    work_types: Vec<WorkTypeRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, id: &str, name: &str, manager_id: &str) -> Self {
        self.stores.push(StoreRecord {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.managers
            .entry(manager_id.to_string())
            .or_default()
            .push(id.to_string());
        self
    }

    pub fn with_employee(mut self, employee: EmployeeRecord) -> Self {
        self.employees.push(employee);
        self
    }

    pub fn with_work_type(mut self, id: &str, store_id: &str, name: &str) -> Self {
        self.work_types.push(WorkTypeRecord {
            id: id.to_string(),
            store_id: store_id.to_string(),
            name: name.to_string(),
        });
        self
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectory {
    async fn stores_for_manager(
        &self,
        manager_id: &str,
    ) -> Result<Vec<StoreRecord>, AssistantError> {
        let owned = self.managers.get(manager_id).cloned().unwrap_or_default();
        Ok(self
            .stores
            .iter()
            .filter(|store| owned.contains(&store.id))
            .cloned()
            .collect())
    }

    async fn employees_in_stores(
        &self,
        store_ids: &[String],
    ) -> Result<Vec<EmployeeRecord>, AssistantError> {
        let mut employees: Vec<EmployeeRecord> = self
            .employees
            .iter()
            .filter(|employee| store_ids.contains(&employee.home_store_id))
            .cloned()
            .collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(employees)
    }

    async fn work_types_in_stores(
        &self,
        store_ids: &[String],
    ) -> Result<Vec<WorkTypeRecord>, AssistantError> {
        Ok(self
            .work_types
            .iter()
            .filter(|work_type| store_ids.contains(&work_type.store_id))
            .cloned()
            .collect())
    }
}

/// Thread store backed by a map, same last-writer-wins semantics as the
/// Postgres upsert.
pub struct InMemoryThreadStore {
    threads: RwLock<HashMap<String, ThreadContext>>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        InMemoryThreadStore {
            threads: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    async fn load(&self, thread_id: &str) -> Result<Option<ThreadContext>, AssistantError> {
        let threads = self
            .threads
            .read()
            .map_err(|err| AssistantError::State(err.to_string()))?;
        Ok(threads.get(thread_id).cloned())
    }

    async fn save(&self, context: &ThreadContext) -> Result<(), AssistantError> {
        let mut threads = self
            .threads
            .write()
            .map_err(|err| AssistantError::State(err.to_string()))?;
        threads.insert(context.thread_id.clone(), context.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::IsoWeek;

    fn employee(id: &str, name: &str, store: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: id.to_string(),
            name: name.to_string(),
            home_store_id: store.to_string(),
            can_work_across_stores: false,
            weekly_minutes_target: 2280,
            role_ids: Vec::new(),
            role_names: Vec::new(),
        }
    }

    #[tokio::test]
    async fn directory_filters_by_manager_and_store() {
        let directory = InMemoryDirectory::new()
            .with_store("st-1", "Antwerp Central", "mgr-1")
            .with_store("st-2", "Ghent South", "mgr-1")
            .with_store("st-3", "Liège North", "mgr-2")
            .with_employee(employee("emp-1", "Bob Smith", "st-1"))
            .with_employee(employee("emp-2", "Anna Peeters", "st-3"));

        let stores = directory
            .stores_for_manager("mgr-1")
            .await
            .expect("stores load");
        assert_eq!(stores.len(), 2);

        let none = directory
            .stores_for_manager("mgr-unknown")
            .await
            .expect("stores load");
        assert!(none.is_empty());

        let employees = directory
            .employees_in_stores(&["st-1".to_string()])
            .await
            .expect("employees load");
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "Bob Smith");
    }

    #[tokio::test]
    async fn thread_store_round_trips_and_overwrites() {
        let store = InMemoryThreadStore::new();
        assert!(store.load("t-1").await.expect("load").is_none());

        let week: IsoWeek = "2025-W43".parse().expect("valid week");
        let mut context = ThreadContext::new(
            "t-1".to_string(),
            "mgr-1".to_string(),
            "st-1".to_string(),
            week,
        );
        store.save(&context).await.expect("save");

        context.state.notes.push("scope changed".to_string());
        store.save(&context).await.expect("overwrite");

        let loaded = store.load("t-1").await.expect("load").expect("present");
        assert_eq!(loaded.state.notes, vec!["scope changed"]);
    }
}
