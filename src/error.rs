use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use derive_more::Display;
use serde_json::json;

use crate::store::StoreError;

/// Failure kinds surfaced by the registry, directory and ledger.
///
/// Every variant except `Storage` is caller-actionable and is raised before
/// any mutation reaches the store.
#[derive(Debug, Display)]
pub enum HrError {
    #[display(fmt = "{} with ID {} not found", entity, id)]
    NotFound { entity: &'static str, id: u64 },

    #[display(fmt = "{} with ID {} does not exist", entity, id)]
    InvalidReference { entity: &'static str, id: u64 },

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(
        fmt = "End date must be greater than or equal to start date ({} < {})",
        end,
        start
    )]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[display(fmt = "{}", _0)]
    InvalidState(String),

    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "storage failure: {}", _0)]
    Storage(StoreError),
}

impl std::error::Error for HrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HrError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for HrError {
    fn from(e: StoreError) -> Self {
        HrError::Storage(e)
    }
}

impl HrError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        HrError::NotFound { entity, id }
    }

    pub fn invalid_reference(entity: &'static str, id: u64) -> Self {
        HrError::InvalidReference { entity, id }
    }
}

impl ResponseError for HrError {
    fn status_code(&self) -> StatusCode {
        match self {
            HrError::NotFound { .. } => StatusCode::NOT_FOUND,
            HrError::InvalidReference { .. } => StatusCode::BAD_REQUEST,
            HrError::Conflict(_) => StatusCode::CONFLICT,
            HrError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            HrError::InvalidState(_) => StatusCode::BAD_REQUEST,
            HrError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HrError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            HrError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
