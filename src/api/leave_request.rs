use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::HrError;
use crate::model::Page;
use crate::model::leave_request::{
    CreateLeave, LeaveDecision, LeaveFilter, LeaveStatus, LeaveType, UpdateLeave,
};
use crate::service::LeaveLedger;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveQuery {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    /// Filter by leave type
    pub leave_type: Option<LeaveType>,
    /// Rows to skip (default 0)
    pub skip: Option<u64>,
    /// Rows to return, 1..=1000 (default 100)
    pub limit: Option<u64>,
}

/* =========================
Create leave request
========================= */
/// Submits a new pending request. Rejected when it shares any day with
/// one of the employee's pending or approved requests.
#[utoipa::path(
    post,
    path = "/api/v1/leaves",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "End date before start date", body = Object, example = json!({
            "message": "End date must be greater than or equal to start date (2024-12-19 < 2024-12-20)"
        })),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Overlaps an active request", body = Object, example = json!({
            "message": "Leave request overlaps with existing leave request (ID: 1)"
        })),
        (status = 422, description = "Invalid payload")
    ),
    tag = "Leave Management"
)]
pub async fn create_leave(
    ledger: web::Data<LeaveLedger>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, HrError> {
    let leave = ledger.create(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(leave))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leaves",
    params(LeaveQuery),
    responses(
        (status = 200, description = "Leave requests ordered by ID", body = [LeaveRequest]),
        (status = 422, description = "Invalid filter or limit")
    ),
    tag = "Leave Management"
)]
pub async fn list_leaves(
    ledger: web::Data<LeaveLedger>,
    query: web::Query<LeaveQuery>,
) -> Result<HttpResponse, HrError> {
    let query = query.into_inner();
    let filter = LeaveFilter {
        employee_id: query.employee_id,
        status: query.status,
        leave_type: query.leave_type,
    };

    let leaves = ledger
        .list(filter, Page::new(query.skip, query.limit))
        .await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leaves/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request with ID 1 not found"
        }))
    ),
    tag = "Leave Management"
)]
pub async fn get_leave(
    ledger: web::Data<LeaveLedger>,
    path: web::Path<u64>,
) -> Result<HttpResponse, HrError> {
    let leave = ledger.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Edit a pending request
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leaves/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to edit")
    ),
    request_body = UpdateLeave,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequest),
        (status = 400, description = "Not pending, or end date before start date", body = Object, example = json!({
            "message": "Cannot update leave request with status 'approved'. Only pending requests can be updated."
        })),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave Management"
)]
pub async fn update_leave(
    ledger: web::Data<LeaveLedger>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeave>,
) -> Result<HttpResponse, HrError> {
    let leave = ledger
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Cancel a pending request
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/leaves/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    responses(
        (status = 204, description = "Leave request cancelled"),
        (status = 400, description = "Leave request is not pending"),
        (status = 404, description = "Leave request not found")
    ),
    tag = "Leave Management"
)]
pub async fn cancel_leave(
    ledger: web::Data<LeaveLedger>,
    path: web::Path<u64>,
) -> Result<HttpResponse, HrError> {
    ledger.cancel(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/* =========================
Approve or reject
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leaves/{id}/approve",
    params(
        ("id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body = LeaveDecision,
    responses(
        (status = 200, description = "Leave request approved or rejected", body = LeaveRequest),
        (status = 400, description = "Leave request is not pending", body = Object, example = json!({
            "message": "Cannot approve leave request with status 'rejected'. Only pending requests can be approved."
        })),
        (status = 404, description = "Leave request or approver not found")
    ),
    tag = "Leave Management"
)]
pub async fn approve_leave(
    ledger: web::Data<LeaveLedger>,
    path: web::Path<u64>,
    payload: web::Json<LeaveDecision>,
) -> Result<HttpResponse, HrError> {
    let leave = ledger
        .approve(path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(leave))
}

#[utoipa::path(
    get,
    path = "/api/v1/leaves/employee/{employee_id}/summary",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Request counts by status and type", body = LeaveSummary),
        (status = 404, description = "Employee not found")
    ),
    tag = "Leave Management"
)]
pub async fn leave_summary(
    ledger: web::Data<LeaveLedger>,
    path: web::Path<u64>,
) -> Result<HttpResponse, HrError> {
    let summary = ledger.summarize(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
