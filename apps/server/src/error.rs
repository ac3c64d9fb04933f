//! # API Error Types
//!
//! The HTTP boundary of the error hierarchy: everything below (validation,
//! business rules, persistence) is translated here into a status code and a
//! stable JSON body.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError / malformed input        → 400 VALIDATION_ERROR       │
//! │  Missing product/customer/bill            → 404 NOT_FOUND              │
//! │  Oversell, duplicate barcode/email/number → 409 CONFLICT               │
//! │  Everything else                          → 500 INTERNAL_ERROR         │
//! │                                                                         │
//! │  Body: { "code": "...", "message": "...", "details": [...]? }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal errors are logged with full detail but surfaced to clients as a
//! generic message; query text and constraint names stay server-side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use bazaar_core::{CoreError, ValidationError};
use bazaar_db::{CheckoutError, DbError};

// =============================================================================
// Error Codes
// =============================================================================

/// Machine-readable error codes returned to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InsufficientStock,
    Duplicate,
    Conflict,
    InternalError,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock | ErrorCode::Duplicate | ErrorCode::Conflict => {
                StatusCode::CONFLICT
            }
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// =============================================================================
// API Error
// =============================================================================

/// An error ready to be serialized to an HTTP response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,

    /// Per-field messages for validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn validation(errors: Vec<ValidationError>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: "Invalid request".to_string(),
            details: errors.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: message.into(),
            details: Vec::new(),
        }
    }

    fn internal() -> Self {
        ApiError::new(ErrorCode::InternalError, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_)
            | CoreError::CustomerNotFound(_)
            | CoreError::BillNotFound(_) => ApiError::not_found(err.to_string()),

            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }

            CoreError::Validation(inner) => ApiError::validation(vec![inner]),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),

            DbError::UniqueViolation { .. } => ApiError::new(ErrorCode::Duplicate, err.to_string()),

            DbError::ForeignKeyViolation { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }

            other => {
                error!(error = %other, "Database error");
                ApiError::internal()
            }
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Core(core) => core.into(),

            // A bill-number conflict that survived every retry is still a
            // conflict, not a server fault
            CheckoutError::Db(db) if db.is_unique_violation_on("bill_number") => {
                ApiError::new(ErrorCode::Conflict, "Bill number conflict, please retry")
            }

            CheckoutError::Db(db) => db.into(),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================
