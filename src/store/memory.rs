use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::lock::{Mutex, OwnedMutexGuard};

use super::{Store, StoreResult, StoreTx};
use crate::model::Page;
use crate::model::department::{CreateDepartment, Department, DepartmentChanges};
use crate::model::employee::{CreateEmployee, Employee, EmployeeChanges, EmployeeFilter};
use crate::model::leave_request::{
    LeaveChanges, LeaveFilter, LeaveRequest, LeaveStatus, NewLeaveRequest,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    departments: BTreeMap<u64, Department>,
    employees: BTreeMap<u64, Employee>,
    leaves: BTreeMap<u64, LeaveRequest>,
    // auto-increment counters, one per table
    department_seq: u64,
    employee_seq: u64,
    leave_seq: u64,
}

fn bump(seq: &mut u64) -> u64 {
    *seq += 1;
    *seq
}

/// Process-local store. One transaction at a time: `begin` waits for the
/// previous transaction to commit or drop, so every transaction is
/// serializable.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.tables.clone().lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryTx { guard, work }))
    }

    async fn close(&self) {}
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_department(&mut self, id: u64) -> StoreResult<Option<Department>> {
        Ok(self.work.departments.get(&id).cloned())
    }

    async fn find_department_by_name(
        &mut self,
        name: &str,
        except: Option<u64>,
    ) -> StoreResult<Option<Department>> {
        Ok(self
            .work
            .departments
            .values()
            .find(|d| Some(d.id) != except && d.same_name(name))
            .cloned())
    }

    async fn list_departments(&mut self, page: Page) -> StoreResult<Vec<Department>> {
        Ok(page.apply(self.work.departments.values().cloned()))
    }

    async fn insert_department(&mut self, new: &CreateDepartment) -> StoreResult<u64> {
        let id = bump(&mut self.work.department_seq);
        self.work.departments.insert(
            id,
            Department {
                id,
                name: new.name.clone(),
                description: new.description.clone(),
                manager_id: new.manager_id,
            },
        );
        Ok(id)
    }

    async fn update_department(
        &mut self,
        id: u64,
        changes: &DepartmentChanges,
    ) -> StoreResult<()> {
        if let Some(dept) = self.work.departments.get_mut(&id) {
            dept.apply(changes);
        }
        Ok(())
    }

    async fn delete_department(&mut self, id: u64) -> StoreResult<()> {
        self.work.departments.remove(&id);
        Ok(())
    }

    async fn find_employee(&mut self, id: u64) -> StoreResult<Option<Employee>> {
        Ok(self.work.employees.get(&id).cloned())
    }

    async fn lock_employee(&mut self, id: u64) -> StoreResult<Option<Employee>> {
        // the whole store is already held by this transaction
        self.find_employee(id).await
    }

    async fn find_employee_by_email(
        &mut self,
        email: &str,
        except: Option<u64>,
    ) -> StoreResult<Option<Employee>> {
        Ok(self
            .work
            .employees
            .values()
            .find(|e| Some(e.id) != except && e.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_employees(
        &mut self,
        filter: &EmployeeFilter,
        page: Page,
    ) -> StoreResult<Vec<Employee>> {
        Ok(page.apply(
            self.work
                .employees
                .values()
                .filter(|e| filter.matches(e))
                .cloned(),
        ))
    }

    async fn count_employees(&mut self, department_id: u64) -> StoreResult<u64> {
        Ok(self
            .work
            .employees
            .values()
            .filter(|e| e.department_id == department_id)
            .count() as u64)
    }

    async fn insert_employee(&mut self, new: &CreateEmployee) -> StoreResult<u64> {
        let id = bump(&mut self.work.employee_seq);
        self.work.employees.insert(
            id,
            Employee {
                id,
                first_name: new.first_name.clone(),
                last_name: new.last_name.clone(),
                email: new.email.clone(),
                phone: new.phone.clone(),
                department_id: new.department_id,
                position: new.position.clone(),
                hire_date: new.hire_date,
                salary: new.salary,
                status: new.status,
            },
        );
        Ok(id)
    }

    async fn update_employee(&mut self, id: u64, changes: &EmployeeChanges) -> StoreResult<()> {
        if let Some(employee) = self.work.employees.get_mut(&id) {
            employee.apply(changes);
        }
        Ok(())
    }

    async fn delete_employee(&mut self, id: u64) -> StoreResult<()> {
        self.work.employees.remove(&id);
        Ok(())
    }

    async fn find_leave(&mut self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        Ok(self.work.leaves.get(&id).cloned())
    }

    async fn list_leaves(
        &mut self,
        filter: &LeaveFilter,
        page: Page,
    ) -> StoreResult<Vec<LeaveRequest>> {
        Ok(page.apply(
            self.work
                .leaves
                .values()
                .filter(|l| filter.matches(l))
                .cloned(),
        ))
    }

    async fn insert_leave(&mut self, new: &NewLeaveRequest) -> StoreResult<u64> {
        let id = bump(&mut self.work.leave_seq);
        self.work.leaves.insert(
            id,
            LeaveRequest {
                id,
                employee_id: new.employee_id,
                leave_type: new.leave_type,
                start_date: new.range.start(),
                end_date: new.range.end(),
                reason: new.reason.clone(),
                status: LeaveStatus::Pending,
                approved_by: None,
                approval_comments: None,
                created_at: new.created_at,
            },
        );
        Ok(id)
    }

    async fn update_leave(&mut self, id: u64, changes: &LeaveChanges) -> StoreResult<()> {
        if let Some(leave) = self.work.leaves.get_mut(&id) {
            leave.apply(changes);
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}
