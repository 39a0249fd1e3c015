use crate::model::department::{
    CreateDepartment, Department, DepartmentChanges, DepartmentStats, DepartmentView,
};
use crate::model::employee::{CreateEmployee, Employee, EmployeeChanges, EmployeeStatus};
use crate::model::leave_request::{
    CreateLeave, LeaveDecision, LeaveRequest, LeaveStatus, LeaveSummary, LeaveType,
    LeaveTypeCounts, UpdateLeave,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS API",
        version = "1.0.0",
        description = r#"
## Human Resource Management System (HRMS)

Keeps the organisation's departments, its employees, and their leave requests.

### 🔹 Key Features
- **Department Management**
  - Create, rename, reassign managers, view head counts and salary stats
  - A department cannot be deleted while employees are assigned to it
- **Employee Management**
  - Create, update, list, and view employee records
- **Leave Management**
  - Submit, edit, or cancel pending requests
  - Approve or reject with comments
  - Requests by one employee may never share a day with another pending
    or approved request

### 📦 Response Format
- JSON bodies; errors are `{"message": "..."}`
- List endpoints take `skip` and `limit` (1 to 1000, default 100)

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::list_leaves,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::leave_summary,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::list_department_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::create_department,
        crate::api::department::get_department,
        crate::api::department::list_departments,
        crate::api::department::update_department,
        crate::api::department::delete_department,
        crate::api::department::department_stats
    ),
    components(
        schemas(
            Department,
            DepartmentView,
            CreateDepartment,
            DepartmentChanges,
            DepartmentStats,
            Employee,
            EmployeeStatus,
            CreateEmployee,
            EmployeeChanges,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            CreateLeave,
            UpdateLeave,
            LeaveDecision,
            LeaveSummary,
            LeaveTypeCounts
        )
    ),
    tags(
        (name = "Departments", description = "Department management APIs"),
        (name = "Employees", description = "Employee management APIs"),
        (name = "Leave Management", description = "Leave request lifecycle APIs"),
    )
)]
pub struct ApiDoc;

/// Prefix the `#[utoipa::path]` annotations are written against.
pub const DOCUMENTED_PREFIX: &str = "/api/v1";

impl ApiDoc {
    /// The document with every path moved under the configured `API_PREFIX`.
    pub fn with_prefix(prefix: &str) -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        let prefix = prefix.trim_end_matches('/');
        let paths = std::mem::take(&mut doc.paths.paths);
        doc.paths.paths = paths
            .into_iter()
            .map(|(path, item)| match path.strip_prefix(DOCUMENTED_PREFIX) {
                Some(rest) => (format!("{prefix}{rest}"), item),
                None => (path, item),
            })
            .collect();
        doc
    }
}
