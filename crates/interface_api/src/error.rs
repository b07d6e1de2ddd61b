//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_bills::BillingError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Validation(msg) => ApiError::Validation(msg),
            BillingError::NoHousehold(_) | BillingError::NoObligors => {
                ApiError::BadRequest(err.to_string())
            }
            BillingError::ObligationNotFound(_) | BillingError::BillNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            BillingError::NotObligor { .. } | BillingError::NotCreator { .. } => {
                ApiError::Forbidden(err.to_string())
            }
            BillingError::InvalidState { .. } => ApiError::Conflict(err.to_string()),
            BillingError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{BillSplitId, PortError, UserId};
    use domain_bills::SplitStatus;

    fn status_of(err: BillingError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_billing_error_status_codes() {
        assert_eq!(status_of(BillingError::validation("bad")), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of(BillingError::NoObligors), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(BillingError::NoHousehold(UserId::new())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(BillingError::ObligationNotFound(BillSplitId::new())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(BillingError::NotObligor {
                split_id: BillSplitId::new(),
                actor: UserId::new()
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(BillingError::InvalidState {
                from: SplitStatus::Paid,
                to: SplitStatus::PendingApproval
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(BillingError::Storage(PortError::connection("down"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
