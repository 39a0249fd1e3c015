use actix_web::{HttpResponse, web};

use crate::api::PageQuery;
use crate::error::HrError;
use crate::model::department::{CreateDepartment, DepartmentChanges};
use crate::service::DepartmentRegistry;

/// Swagger doc for list_departments endpoint
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    params(PageQuery),
    responses(
        (status = 200, description = "Departments with their head counts", body = [DepartmentView]),
        (status = 422, description = "Limit out of range", body = Object, example = json!({
            "message": "limit must be between 1 and 1000"
        }))
    ),
    tag = "Departments"
)]
pub async fn list_departments(
    registry: web::Data<DepartmentRegistry>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, HrError> {
    let departments = registry.list(query.page()).await?;
    Ok(HttpResponse::Ok().json(departments))
}

#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = DepartmentView),
        (status = 400, description = "Manager does not exist", body = Object, example = json!({
            "message": "Employee with ID 5 does not exist"
        })),
        (status = 409, description = "Name already taken", body = Object, example = json!({
            "message": "Department with name 'Engineering' already exists"
        })),
        (status = 422, description = "Invalid payload")
    ),
    tag = "Departments"
)]
pub async fn create_department(
    registry: web::Data<DepartmentRegistry>,
    payload: web::Json<CreateDepartment>,
) -> Result<HttpResponse, HrError> {
    let department = registry.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(department))
}

#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}",
    params(
        ("id" = u64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department found", body = DepartmentView),
        (status = 404, description = "Department not found", body = Object, example = json!({
            "message": "Department with ID 1 not found"
        }))
    ),
    tag = "Departments"
)]
pub async fn get_department(
    registry: web::Data<DepartmentRegistry>,
    path: web::Path<u64>,
) -> Result<HttpResponse, HrError> {
    let department = registry.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(department))
}

/// Partial update; send `"manager_id": null` to clear the manager.
#[utoipa::path(
    put,
    path = "/api/v1/departments/{id}",
    params(
        ("id" = u64, Path, description = "Department ID")
    ),
    request_body = DepartmentChanges,
    responses(
        (status = 200, description = "Department updated", body = DepartmentView),
        (status = 400, description = "Manager does not exist"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Name already taken")
    ),
    tag = "Departments"
)]
pub async fn update_department(
    registry: web::Data<DepartmentRegistry>,
    path: web::Path<u64>,
    payload: web::Json<DepartmentChanges>,
) -> Result<HttpResponse, HrError> {
    let department = registry
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(department))
}

#[utoipa::path(
    delete,
    path = "/api/v1/departments/{id}",
    params(
        ("id" = u64, Path, description = "Department ID")
    ),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 400, description = "Employees still assigned to the department", body = Object, example = json!({
            "message": "Department 1 has dependents: 3 employee(s) still assigned. Reassign or remove them first."
        })),
        (status = 404, description = "Department not found")
    ),
    tag = "Departments"
)]
pub async fn delete_department(
    registry: web::Data<DepartmentRegistry>,
    path: web::Path<u64>,
) -> Result<HttpResponse, HrError> {
    registry.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}/stats",
    params(
        ("id" = u64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Head count and salary figures", body = DepartmentStats),
        (status = 404, description = "Department not found")
    ),
    tag = "Departments"
)]
pub async fn department_stats(
    registry: web::Data<DepartmentRegistry>,
    path: web::Path<u64>,
) -> Result<HttpResponse, HrError> {
    let stats = registry.stats(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::{Value, json};

    use crate::api::test_app;
    use crate::service::fixtures::{seeded, services};

    #[actix_web::test]
    async fn create_then_fetch() {
        let app = test_app!(services());

        let req = TestRequest::post()
            .uri("/api/v1/departments")
            .set_json(json!({
                "name": "Engineering",
                "description": "Software development and engineering team"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["employee_count"], 0);
        assert_eq!(created["manager_id"], Value::Null);

        let fetched: Value = test::call_and_read_body_json(
            &app,
            TestRequest::get().uri("/api/v1/departments/1").to_request(),
        )
        .await;
        assert_eq!(fetched, created);
    }

    #[actix_web::test]
    async fn duplicate_name_is_409() {
        let app = test_app!(seeded().await);

        let req = TestRequest::post()
            .uri("/api/v1/departments")
            .set_json(json!({ "name": "engineering", "description": "again" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["message"],
            "Department with name 'engineering' already exists"
        );
    }

    #[actix_web::test]
    async fn delete_with_employees_is_refused() {
        let app = test_app!(seeded().await);

        let resp = test::call_service(
            &app,
            TestRequest::delete().uri("/api/v1/departments/1").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            TestRequest::delete().uri("/api/v1/departments/9").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn null_manager_clears_it() {
        let app = test_app!(seeded().await);

        let req = TestRequest::put()
            .uri("/api/v1/departments/1")
            .set_json(json!({ "manager_id": 2 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["manager_id"], 2);

        let req = TestRequest::put()
            .uri("/api/v1/departments/1")
            .set_json(json!({ "description": "Platform" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["manager_id"], 2);
        assert_eq!(body["description"], "Platform");

        let req = TestRequest::put()
            .uri("/api/v1/departments/1")
            .set_json(json!({ "manager_id": null }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["manager_id"], Value::Null);
    }

    #[actix_web::test]
    async fn stats_and_paging() {
        let app = test_app!(seeded().await);

        let stats: Value = test::call_and_read_body_json(
            &app,
            TestRequest::get()
                .uri("/api/v1/departments/1/stats")
                .to_request(),
        )
        .await;
        assert_eq!(stats["department_name"], "Engineering");
        assert_eq!(stats["total_employees"], 2);
        assert_eq!(stats["average_salary"], 60000.0);

        let resp = test::call_service(
            &app,
            TestRequest::get()
                .uri("/api/v1/departments?limit=1001")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
