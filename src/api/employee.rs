use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::HrError;
use crate::model::Page;
use crate::model::employee::{CreateEmployee, EmployeeChanges, EmployeeFilter, EmployeeStatus};
use crate::service::EmployeeDirectory;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// Filter by department
    pub department_id: Option<u64>,
    /// Filter by employment status
    pub status: Option<EmployeeStatus>,
    /// Rows to skip (default 0)
    pub skip: Option<u64>,
    /// Rows to return, 1..=1000 (default 100)
    pub limit: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Department does not exist", body = Object, example = json!({
            "message": "Department with ID 1 does not exist"
        })),
        (status = 409, description = "Email already registered", body = Object, example = json!({
            "message": "Email john.doe@company.com is already registered"
        })),
        (status = 422, description = "Invalid payload")
    ),
    tag = "Employees"
)]
pub async fn create_employee(
    directory: web::Data<EmployeeDirectory>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, HrError> {
    let employee = directory.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employees ordered by ID", body = [Employee]),
        (status = 422, description = "Invalid filter or limit")
    ),
    tag = "Employees"
)]
pub async fn list_employees(
    directory: web::Data<EmployeeDirectory>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, HrError> {
    let query = query.into_inner();
    let filter = EmployeeFilter {
        department_id: query.department_id,
        status: query.status,
    };

    let employees = directory
        .list(filter, Page::new(query.skip, query.limit))
        .await?;
    Ok(HttpResponse::Ok().json(employees))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/department/{department_id}/employees",
    params(
        ("department_id" = u64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Every employee of the department", body = [Employee]),
        (status = 404, description = "Department not found")
    ),
    tag = "Employees"
)]
pub async fn list_department_employees(
    directory: web::Data<EmployeeDirectory>,
    path: web::Path<u64>,
) -> Result<HttpResponse, HrError> {
    let employees = directory.list_by_department(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employees))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee with ID 1 not found"
        }))
    ),
    tag = "Employees"
)]
pub async fn get_employee(
    directory: web::Data<EmployeeDirectory>,
    path: web::Path<u64>,
) -> Result<HttpResponse, HrError> {
    let employee = directory.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    request_body = EmployeeChanges,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Department does not exist"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid payload")
    ),
    tag = "Employees"
)]
pub async fn update_employee(
    directory: web::Data<EmployeeDirectory>,
    path: web::Path<u64>,
    payload: web::Json<EmployeeChanges>,
) -> Result<HttpResponse, HrError> {
    let employee = directory
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employees"
)]
pub async fn delete_employee(
    directory: web::Data<EmployeeDirectory>,
    path: web::Path<u64>,
) -> Result<HttpResponse, HrError> {
    directory.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
