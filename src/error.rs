//! Error taxonomy for scheduling operations.

use serde::Serialize;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A referenced task or event id does not resolve.
    NotFound,
    /// Both entities exist but are not related.
    NotLinked,
    /// Uniqueness violation.
    Conflict,
    /// Input rejected before any write.
    ValidationError,
    /// Underlying data-store failure.
    StoreError,
}

/// Errors returned by the store and the scheduling service.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Event {event_id} is not linked to task {task_id}")]
    NotLinked { task_id: String, event_id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Store error: {0}")]
    Store(String),
}

impl CrmError {
    pub fn task_not_found(id: &str) -> Self {
        CrmError::NotFound {
            entity: "Task",
            id: id.to_string(),
        }
    }

    pub fn event_not_found(id: &str) -> Self {
        CrmError::NotFound {
            entity: "Event",
            id: id.to_string(),
        }
    }

    pub fn not_linked(task_id: &str, event_id: &str) -> Self {
        CrmError::NotLinked {
            task_id: task_id.to_string(),
            event_id: event_id.to_string(),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        CrmError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::invalid(field, format!("{} is required", field))
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        CrmError::Store(err.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CrmError::NotFound { .. } => ErrorCode::NotFound,
            CrmError::NotLinked { .. } => ErrorCode::NotLinked,
            CrmError::Conflict(_) => ErrorCode::Conflict,
            CrmError::Validation { .. } => ErrorCode::ValidationError,
            CrmError::Store(_) => ErrorCode::StoreError,
        }
    }

    /// Field name for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            CrmError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for CrmError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err
            && failure.code == rusqlite::ErrorCode::ConstraintViolation
            && matches!(
                failure.extended_code,
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            )
        {
            return CrmError::Conflict(
                message
                    .clone()
                    .unwrap_or_else(|| "uniqueness constraint violated".to_string()),
            );
        }
        CrmError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        CrmError::Store(format!("serialization failed: {}", err))
    }
}

/// Serializable error body for callers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&CrmError> for ErrorResponse {
    fn from(err: &CrmError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            field: err.field().map(str::to_string),
        }
    }
}

/// Result type for scheduling operations.
pub type Result<T> = std::result::Result<T, CrmError>;
