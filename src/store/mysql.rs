use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder, Transaction};
use tracing::{debug, info};

use super::{Store, StoreError, StoreResult, StoreTx};
use crate::model::Page;
use crate::model::department::{CreateDepartment, Department, DepartmentChanges};
use crate::model::employee::{
    CreateEmployee, Employee, EmployeeChanges, EmployeeFilter, EmployeeStatus,
};
use crate::model::leave_request::{
    LeaveChanges, LeaveFilter, LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest,
};
use crate::utils::db_utils::{Assignments, build_update_sql, execute_update};

const DEPARTMENT_COLUMNS: &str = "id, name, description, manager_id";
const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, phone, department_id, \
     position, hire_date, salary, status";
const LEAVE_COLUMNS: &str = "id, employee_id, leave_type, start_date, end_date, reason, \
     status, approved_by, approval_comments, created_at";

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connects and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))?;

        info!("Database schema is up to date");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MySqlTx { tx }))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

pub struct MySqlTx {
    tx: Transaction<'static, MySql>,
}

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    department_id: u64,
    position: String,
    hire_date: NaiveDate,
    salary: f64,
    status: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = StoreError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let status = parse_column("employees", row.id, &row.status)?;
        Ok(Employee {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            department_id: row.department_id,
            position: row.position,
            hire_date: row.hire_date,
            salary: row.salary,
            status,
        })
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: u64,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    status: String,
    approved_by: Option<u64>,
    approval_comments: Option<String>,
    created_at: NaiveDate,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let leave_type: LeaveType = parse_column("leave_requests", row.id, &row.leave_type)?;
        let status: LeaveStatus = parse_column("leave_requests", row.id, &row.status)?;
        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            leave_type,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status,
            approved_by: row.approved_by,
            approval_comments: row.approval_comments,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct DepartmentRow {
    id: u64,
    name: String,
    description: String,
    manager_id: Option<u64>,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department {
            id: row.id,
            name: row.name,
            description: row.description,
            manager_id: row.manager_id,
        }
    }
}

fn parse_column<T: FromStr>(table: &'static str, id: u64, raw: &str) -> StoreResult<T> {
    T::from_str(raw).map_err(|_| StoreError::Corrupt {
        table,
        id,
        detail: format!("unknown enum value '{raw}'"),
    })
}

fn push_page(qb: &mut QueryBuilder<'_, MySql>, page: Page) {
    qb.push(" ORDER BY id LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.skip);
}

#[async_trait]
impl StoreTx for MySqlTx {
    async fn find_department(&mut self, id: u64) -> StoreResult<Option<Department>> {
        let sql = format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = ?");
        let row = sqlx::query_as::<_, DepartmentRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Department::from))
    }

    async fn find_department_by_name(
        &mut self,
        name: &str,
        except: Option<u64>,
    ) -> StoreResult<Option<Department>> {
        let mut qb = QueryBuilder::<MySql>::new(format!(
            "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE LOWER(name) = LOWER("
        ));
        qb.push_bind(name.to_string()).push(")");
        if let Some(id) = except {
            qb.push(" AND id <> ").push_bind(id);
        }
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<DepartmentRow>()
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Department::from))
    }

    async fn list_departments(&mut self, page: Page) -> StoreResult<Vec<Department>> {
        let mut qb =
            QueryBuilder::<MySql>::new(format!("SELECT {DEPARTMENT_COLUMNS} FROM departments"));
        push_page(&mut qb, page);

        let rows = qb
            .build_query_as::<DepartmentRow>()
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Department::from).collect())
    }

    async fn insert_department(&mut self, new: &CreateDepartment) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO departments (name, description, manager_id)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.manager_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn update_department(
        &mut self,
        id: u64,
        changes: &DepartmentChanges,
    ) -> StoreResult<()> {
        let mut set = Assignments::new();
        set.set("name", changes.name.clone())
            .set("description", changes.description.clone())
            .set("manager_id", changes.manager_id);

        if let Some(update) = build_update_sql("departments", set, "id", id) {
            execute_update(&mut *self.tx, update).await?;
        }
        Ok(())
    }

    async fn delete_department(&mut self, id: u64) -> StoreResult<()> {
        sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_employee(&mut self, id: u64) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Employee::try_from).transpose()
    }

    async fn lock_employee(&mut self, id: u64) -> StoreResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ? FOR UPDATE");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Employee::try_from).transpose()
    }

    async fn find_employee_by_email(
        &mut self,
        email: &str,
        except: Option<u64>,
    ) -> StoreResult<Option<Employee>> {
        let mut qb = QueryBuilder::<MySql>::new(format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE LOWER(email) = LOWER("
        ));
        qb.push_bind(email.to_string()).push(")");
        if let Some(id) = except {
            qb.push(" AND id <> ").push_bind(id);
        }
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<EmployeeRow>()
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Employee::try_from).transpose()
    }

    async fn list_employees(
        &mut self,
        filter: &EmployeeFilter,
        page: Page,
    ) -> StoreResult<Vec<Employee>> {
        let mut qb = QueryBuilder::<MySql>::new(format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE 1=1"
        ));
        if let Some(department_id) = filter.department_id {
            qb.push(" AND department_id = ").push_bind(department_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str().to_string());
        }
        push_page(&mut qb, page);
        debug!(sql = %qb.sql(), ?filter, "Listing employees");

        let rows = qb
            .build_query_as::<EmployeeRow>()
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn count_employees(&mut self, department_id: u64) -> StoreResult<u64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM employees WHERE department_id = ?",
        )
        .bind(department_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn insert_employee(&mut self, new: &CreateEmployee) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees
            (first_name, last_name, email, phone, department_id, position, hire_date, salary, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(new.department_id)
        .bind(&new.position)
        .bind(new.hire_date)
        .bind(new.salary)
        .bind(new.status.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn update_employee(&mut self, id: u64, changes: &EmployeeChanges) -> StoreResult<()> {
        let mut set = Assignments::new();
        set.set("first_name", changes.first_name.clone())
            .set("last_name", changes.last_name.clone())
            .set("email", changes.email.clone())
            .set("phone", changes.phone.clone())
            .set("department_id", changes.department_id)
            .set("position", changes.position.clone())
            .set("salary", changes.salary)
            .set("status", changes.status.map(|s| s.as_str().to_string()));

        if let Some(update) = build_update_sql("employees", set, "id", id) {
            execute_update(&mut *self.tx, update).await?;
        }
        Ok(())
    }

    async fn delete_employee(&mut self, id: u64) -> StoreResult<()> {
        sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_leave(&mut self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(LeaveRequest::try_from).transpose()
    }

    async fn list_leaves(
        &mut self,
        filter: &LeaveFilter,
        page: Page,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let mut qb = QueryBuilder::<MySql>::new(format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE 1=1"
        ));
        if let Some(employee_id) = filter.employee_id {
            qb.push(" AND employee_id = ").push_bind(employee_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str().to_string());
        }
        if let Some(leave_type) = filter.leave_type {
            qb.push(" AND leave_type = ")
                .push_bind(leave_type.as_str().to_string());
        }
        push_page(&mut qb, page);
        debug!(sql = %qb.sql(), ?filter, "Listing leave requests");

        let rows = qb
            .build_query_as::<LeaveRow>()
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn insert_leave(&mut self, new: &NewLeaveRequest) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, leave_type, start_date, end_date, reason, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.leave_type.as_str())
        .bind(new.range.start())
        .bind(new.range.end())
        .bind(&new.reason)
        .bind(LeaveStatus::Pending.as_str())
        .bind(new.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn update_leave(&mut self, id: u64, changes: &LeaveChanges) -> StoreResult<()> {
        let mut set = Assignments::new();
        set.set("leave_type", changes.leave_type.map(|t| t.as_str().to_string()))
            .set("start_date", changes.start_date)
            .set("end_date", changes.end_date)
            .set("reason", changes.reason.clone())
            .set("status", changes.status.map(|s| s.as_str().to_string()))
            .set("approved_by", changes.approved_by)
            .set("approval_comments", changes.approval_comments.clone());

        if let Some(update) = build_update_sql("leave_requests", set, "id", id) {
            execute_update(&mut *self.tx, update).await?;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_enum_values_surface_as_corrupt_rows() {
        let err = parse_column::<LeaveStatus>("leave_requests", 12, "archived").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Corrupt {
                table: "leave_requests",
                id: 12,
                ..
            }
        ));
    }

    #[test]
    fn rows_decode_into_typed_records() {
        let row = LeaveRow {
            id: 1,
            employee_id: 3,
            leave_type: "vacation".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            reason: "Year-end vacation".into(),
            status: "approved".into(),
            approved_by: Some(2),
            approval_comments: None,
            created_at: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        };
        let leave = LeaveRequest::try_from(row).unwrap();
        assert_eq!(leave.leave_type, LeaveType::Vacation);
        assert_eq!(leave.status, LeaveStatus::Approved);

        let row = EmployeeRow {
            id: 2,
            first_name: "Jane".into(),
            last_name: "Smith".into(),
            email: "jane@company.com".into(),
            phone: "+1234567891".into(),
            department_id: 1,
            position: "Manager".into(),
            hire_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            salary: 95000.0,
            status: "on_leave".into(),
        };
        assert_eq!(
            Employee::try_from(row).unwrap().status,
            EmployeeStatus::OnLeave
        );
    }
}
