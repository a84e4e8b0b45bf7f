use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Webhook signature verification failed")]
    AuthenticationFailure,

    #[error("Payload does not match the expected schema at {field}")]
    SchemaMismatch { field: String },

    #[error("Invalid event: {0}")]
    ValidationFailure(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("A record for this subscription already exists")]
    StoreConflict,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Request body could not be read: {0}")]
    InvalidBody(String),

    #[error("Not found")]
    NotFound,

    #[error("Notification dispatch failed: {0}")]
    DispatchFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Transient failures the provider should redeliver. Everything else is
    /// acknowledged so the provider stops retrying a payload that can never
    /// succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    AuthenticationFailure,
    SchemaMismatch,
    ValidationFailure,
    StoreUnavailable,
    StoreConflict,
    PayloadTooLarge,
    InvalidBody,
    NotFound,
    DispatchFailure,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthenticationFailure => "AUTHENTICATION_FAILURE",
            ErrorCode::SchemaMismatch => "SCHEMA_MISMATCH",
            ErrorCode::ValidationFailure => "VALIDATION_FAILURE",
            ErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorCode::StoreConflict => "STORE_CONFLICT",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::InvalidBody => "INVALID_BODY",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::DispatchFailure => "DISPATCH_FAILURE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
