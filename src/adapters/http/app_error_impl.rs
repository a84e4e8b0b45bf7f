use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::AuthenticationFailure => error_resp(
                StatusCode::UNAUTHORIZED,
                ErrorCode::AuthenticationFailure,
                None,
            ),
            AppError::SchemaMismatch { field } => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::SchemaMismatch,
                Some(field),
            ),
            AppError::ValidationFailure(msg) => error_resp(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ValidationFailure,
                Some(msg),
            ),
            AppError::StoreUnavailable(_) => error_resp(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::StoreUnavailable,
                None,
            ),
            AppError::StoreConflict => {
                error_resp(StatusCode::CONFLICT, ErrorCode::StoreConflict, None)
            }
            AppError::PayloadTooLarge => error_resp(
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorCode::PayloadTooLarge,
                None,
            ),
            AppError::InvalidBody(_) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidBody, None)
            }
            AppError::NotFound => error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, None),
            AppError::DispatchFailure(_) => {
                error_resp(StatusCode::BAD_GATEWAY, ErrorCode::DispatchFailure, None)
            }
            AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                None,
            ),
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
