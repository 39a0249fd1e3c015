//! Persistence seam shared by the department registry, the employee
//! directory and the leave ledger.
//!
//! Every manager operation opens one [`StoreTx`], reads and validates
//! through it, writes, and commits. Dropping a transaction without calling
//! [`StoreTx::commit`] discards its writes.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use derive_more::Display;

use crate::model::Page;
use crate::model::department::{CreateDepartment, Department, DepartmentChanges};
use crate::model::employee::{CreateEmployee, Employee, EmployeeChanges, EmployeeFilter};
use crate::model::leave_request::{LeaveChanges, LeaveFilter, LeaveRequest, NewLeaveRequest};

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "corrupt {} row {}: {}", table, id, detail)]
    Corrupt {
        table: &'static str,
        id: u64,
        detail: String,
    },
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            StoreError::Corrupt { .. } => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the backing store, built once at startup and closed at shutdown.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    async fn close(&self);
}

#[async_trait]
pub trait StoreTx: Send {
    // departments
    async fn find_department(&mut self, id: u64) -> StoreResult<Option<Department>>;
    /// Case-insensitive match, optionally ignoring the department `except`.
    async fn find_department_by_name(
        &mut self,
        name: &str,
        except: Option<u64>,
    ) -> StoreResult<Option<Department>>;
    async fn list_departments(&mut self, page: Page) -> StoreResult<Vec<Department>>;
    async fn insert_department(&mut self, new: &CreateDepartment) -> StoreResult<u64>;
    async fn update_department(&mut self, id: u64, changes: &DepartmentChanges)
    -> StoreResult<()>;
    async fn delete_department(&mut self, id: u64) -> StoreResult<()>;

    // employees
    async fn find_employee(&mut self, id: u64) -> StoreResult<Option<Employee>>;
    /// Like `find_employee`, but holds the row until the transaction ends so
    /// writers touching the same employee's leave requests serialize.
    async fn lock_employee(&mut self, id: u64) -> StoreResult<Option<Employee>>;
    async fn find_employee_by_email(
        &mut self,
        email: &str,
        except: Option<u64>,
    ) -> StoreResult<Option<Employee>>;
    async fn list_employees(
        &mut self,
        filter: &EmployeeFilter,
        page: Page,
    ) -> StoreResult<Vec<Employee>>;
    async fn count_employees(&mut self, department_id: u64) -> StoreResult<u64>;
    async fn insert_employee(&mut self, new: &CreateEmployee) -> StoreResult<u64>;
    async fn update_employee(&mut self, id: u64, changes: &EmployeeChanges) -> StoreResult<()>;
    async fn delete_employee(&mut self, id: u64) -> StoreResult<()>;

    // leave requests
    async fn find_leave(&mut self, id: u64) -> StoreResult<Option<LeaveRequest>>;
    async fn list_leaves(
        &mut self,
        filter: &LeaveFilter,
        page: Page,
    ) -> StoreResult<Vec<LeaveRequest>>;
    async fn insert_leave(&mut self, new: &NewLeaveRequest) -> StoreResult<u64>;
    async fn update_leave(&mut self, id: u64, changes: &LeaveChanges) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
