pub mod department;
pub mod employee;
pub mod leave_request;

use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::config::Config;
use crate::error::HrError;
use crate::model::Page;
use crate::service::Services;

/// skip/limit query parameters shared by the list endpoints
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Rows to skip (default 0)
    pub skip: Option<u64>,
    /// Rows to return, 1..=1000 (default 100)
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}

/// Hands each manager to the handlers as its own `Data`.
pub fn register_services(cfg: &mut web::ServiceConfig, services: &Services) {
    cfg.app_data(web::Data::new(services.departments.clone()))
        .app_data(web::Data::new(services.employees.clone()))
        .app_data(web::Data::new(services.leaves.clone()));
}

/// Malformed bodies and query strings answer like any other validation
/// failure: 422 with a `message`.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| HrError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| HrError::Validation(err.to_string()).into()),
    );
}

/// Every API resource, relative to the prefix scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(extractor_configs)
        .service(
            web::scope("/employees")
                .service(
                    web::resource("")
                        .route(web::get().to(employee::list_employees))
                        .route(web::post().to(employee::create_employee)),
                )
                .service(
                    web::resource("/department/{department_id}/employees")
                        .route(web::get().to(employee::list_department_employees)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(employee::get_employee))
                        .route(web::put().to(employee::update_employee))
                        .route(web::delete().to(employee::delete_employee)),
                ),
        )
        .service(
            web::scope("/departments")
                .service(
                    web::resource("")
                        .route(web::get().to(department::list_departments))
                        .route(web::post().to(department::create_department)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(department::get_department))
                        .route(web::put().to(department::update_department))
                        .route(web::delete().to(department::delete_department)),
                )
                .service(
                    web::resource("/{id}/stats")
                        .route(web::get().to(department::department_stats)),
                ),
        )
        .service(
            web::scope("/leaves")
                .service(
                    web::resource("")
                        .route(web::get().to(leave_request::list_leaves))
                        .route(web::post().to(leave_request::create_leave)),
                )
                .service(
                    web::resource("/employee/{employee_id}/summary")
                        .route(web::get().to(leave_request::leave_summary)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(leave_request::get_leave))
                        .route(web::put().to(leave_request::update_leave))
                        .route(web::delete().to(leave_request::cancel_leave)),
                )
                .service(
                    web::resource("/{id}/approve")
                        .route(web::post().to(leave_request::approve_leave)),
                ),
        );
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the HRMS API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/swagger-ui/"
    }))
}

#[get("/health")]
pub async fn health(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "environment": config.environment
    }))
}

/// Builds an in-process app over `services` with the API mounted at
/// `/api/v1`, without the rate limiter.
#[cfg(test)]
macro_rules! test_app {
    ($services:expr) => {{
        let services: $crate::service::Services = $services;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($crate::config::Config::default()))
                .configure(|cfg| $crate::api::register_services(cfg, &services))
                .service($crate::api::index)
                .service($crate::api::health)
                .service(actix_web::web::scope("/api/v1").configure($crate::api::configure)),
        )
        .await
    }};
}

#[cfg(test)]
pub(crate) use test_app;

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use serde_json::Value;

    use crate::service::fixtures::services;

    #[actix_web::test]
    async fn health_reports_environment() {
        let app = test_app!(services());

        let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "dev");
    }

    #[actix_web::test]
    async fn index_points_at_the_docs() {
        let app = test_app!(services());

        let body: Value =
            test::call_and_read_body_json(&app, TestRequest::get().uri("/").to_request()).await;
        assert_eq!(body["docs"], "/swagger-ui/");
    }

    #[actix_web::test]
    async fn malformed_json_is_a_validation_failure() {
        let app = test_app!(services());

        let req = TestRequest::post()
            .uri("/api/v1/departments")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].is_string());
    }

    #[actix_web::test]
    async fn bad_query_strings_are_validation_failures() {
        let app = test_app!(services());

        let req = TestRequest::get()
            .uri("/api/v1/leaves?status=archived")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
