//! The three record managers. Each one owns a handle to the shared store,
//! runs every operation inside a single store transaction, and only reads
//! the entities owned by the others.

pub mod department;
pub mod employee;
pub mod leave;

use std::sync::Arc;

use crate::store::Store;

pub use department::DepartmentRegistry;
pub use employee::EmployeeDirectory;
pub use leave::LeaveLedger;

#[derive(Clone)]
pub struct Services {
    pub departments: DepartmentRegistry,
    pub employees: EmployeeDirectory,
    pub leaves: LeaveLedger,
}

impl Services {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            departments: DepartmentRegistry::new(store.clone()),
            employees: EmployeeDirectory::new(store.clone()),
            leaves: LeaveLedger::new(store),
        }
    }
}
