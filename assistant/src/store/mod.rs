pub mod directory;
pub mod memory;
pub mod threads;

pub use directory::{
    DirectoryStore, EmployeeRecord, PgDirectoryStore, StoreRecord, WorkTypeRecord,
};
pub use memory::{InMemoryDirectory, InMemoryThreadStore};
pub use threads::{PgThreadStore, ThreadStore};
