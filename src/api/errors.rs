//! Unified REST API error handling: one error enum, a standardized JSON
//! error body, and consistent status-code mapping.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Standardized error response format.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Field-specific validation errors (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<FieldError>>,
    /// Timestamp of the error
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Field-specific validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String, errors: Vec<FieldError> },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Resource already exists: {resource}")]
    Conflict { resource: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl ApiError {
    /// Error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "AUTH_REQUIRED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::ValidationFailed { .. } => "VALIDATION_FAILED",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::StorageError { .. } => "STORAGE_ERROR",
            ApiError::InternalError { .. } => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::ValidationFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::StorageError { .. } | ApiError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match status.as_u16() {
            400..=499 => log::warn!("Client error: {} ({})", self, status),
            _ => log::error!("Server error: {} ({})", self, status),
        }

        let validation_errors = match self {
            ApiError::ValidationFailed { errors, .. } => Some(errors.clone()),
            _ => None,
        };

        HttpResponse::build(status).json(ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
            validation_errors,
            timestamp: chrono::Utc::now(),
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(resource) => ApiError::NotFound { resource },
            StoreError::Duplicate(resource) => ApiError::Conflict { resource },
            StoreError::VersionConflict(_) => ApiError::StorageError { message: err.to_string() },
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();

        ApiError::ValidationFailed {
            message: "Request validation failed".to_string(),
            errors: field_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::Unauthorized.code(), "AUTH_REQUIRED");
        assert_eq!(
            ApiError::NotFound { resource: "Email x".to_string() }.code(),
            "NOT_FOUND"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden { reason: "nope".to_string() }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Conflict { resource: "user".to_string() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::StorageError { message: "contention".to_string() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let api_error: ApiError = StoreError::Duplicate("a@example.com".to_string()).into();
        assert!(matches!(api_error, ApiError::Conflict { .. }));
    }

    #[test]
    fn test_validation_error_conversion() {
        use validator::Validate;

        #[derive(Validate)]
        struct TestStruct {
            #[validate(length(min = 1))]
            field: String,
        }

        let result = TestStruct { field: String::new() }.validate();
        let api_error: ApiError = result.unwrap_err().into();
        if let ApiError::ValidationFailed { errors, .. } = api_error {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "field");
        } else {
            panic!("Expected ValidationFailed error");
        }
    }
}
