//! Error types for web handlers.
//!
//! Bridges [`GatePassError`] to HTTP responses through Axum's
//! `IntoResponse`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gatepass_core::GatePassError;
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let outcome = state.checkin.check_in(&request.token).await?;
///     Ok(Json(outcome))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Structured context for the client, such as holder info
    details: Option<serde_json::Value>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            details: None,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Attach structured details to the response body.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a 402 Payment Required error.
    #[must_use]
    pub fn payment_required(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYMENT_REQUIRED,
            message.into(),
            "PAYMENT_REQUIRED".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), code.to_string())
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
    /// Optional structured context.
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<GatePassError> for AppError {
    fn from(err: GatePassError) -> Self {
        let message = err.to_string();
        match err {
            GatePassError::Validation { .. } => Self::validation(message),
            GatePassError::DuplicateIdentity { .. } => Self::conflict("DUPLICATE_IDENTITY", message),
            GatePassError::DuplicateReference { .. } => {
                Self::conflict("DUPLICATE_REFERENCE", message)
            }
            GatePassError::PaymentAlreadyConfirmed { .. } => {
                Self::conflict("PAYMENT_ALREADY_CONFIRMED", message)
            }
            GatePassError::InvalidCredential => Self::new(
                StatusCode::BAD_REQUEST,
                message,
                "INVALID_CREDENTIAL".to_string(),
            ),
            GatePassError::NotFound { identity } => Self::not_found("Registration", identity),
            GatePassError::PaymentRequired { holder } => {
                let error = Self::payment_required(message);
                match serde_json::to_value(&*holder) {
                    Ok(details) => error.with_details(details),
                    Err(_) => error,
                }
            }
            GatePassError::Config(_) | GatePassError::Rendering(_) | GatePassError::Storage(_) => {
                Self::internal("An internal error occurred").with_source(anyhow::Error::new(err))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use gatepass_core::{HolderSummary, Identity, PassCategory};

    #[test]
    fn test_error_display() {
        let err = AppError::validation("Invalid input");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] Invalid input");
    }

    #[test]
    fn test_validation() {
        let err = AppError::from(GatePassError::validation("age must be between 1 and 120"));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_conflicts_map_to_409() {
        let err = AppError::from(GatePassError::DuplicateReference {
            reference: "TXN1".to_string(),
        });
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "DUPLICATE_REFERENCE");
    }

    #[test]
    fn test_payment_required_carries_holder() {
        let holder = HolderSummary {
            identity: Identity::new("a@x.com"),
            holder_name: "Asha".to_string(),
            pass_category: PassCategory::Couple,
            purchase_quantity: 1,
            checked_in: false,
        };
        let err = AppError::from(GatePassError::payment_required(holder));

        assert_eq!(err.status, StatusCode::PAYMENT_REQUIRED);
        let details = err.details.as_ref().expect("holder details");
        assert_eq!(details["holder_name"], "Asha");
        assert_eq!(details["checked_in"], false);
    }

    #[test]
    fn test_storage_errors_are_hidden() {
        let err = AppError::from(GatePassError::Storage("connection refused".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("connection refused"));
        assert!(err.source.is_some());
    }
}
