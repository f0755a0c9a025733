//! Error types for inkfeed.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Result type returned by engagement actions.
pub type EngagementResult<T> = Result<T, EngagementError>;

/// Infrastructure error type, produced by the persistence layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A unique index rejected an insert.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Returns the error code for logs and error reports.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Classified error surfaced by the engagement managers.
///
/// Every failure inside a manager is converted into one of these before it
/// leaves the manager boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngagementError {
    /// No identity is present; the caller should redirect to sign-in.
    #[error("Authentication required")]
    Unauthenticated,

    /// The action is never allowed, e.g. following yourself.
    #[error("Forbidden operation: {0}")]
    ForbiddenOperation(String),

    /// A remote insert or delete failed; the optimistic change was rolled back.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A remote read failed; the affected view fell back to a default.
    #[error("Fetch error: {0}")]
    Fetch(String),
}

impl EngagementError {
    /// Wrap a store failure on a write path.
    #[must_use]
    pub fn persistence(err: &AppError) -> Self {
        Self::Persistence(err.to_string())
    }

    /// Wrap a store failure on a read path.
    #[must_use]
    pub fn fetch(err: &AppError) -> Self {
        Self::Fetch(err.to_string())
    }

    /// Returns the error code for logs and toasts.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::ForbiddenOperation(_) => "FORBIDDEN_OPERATION",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Fetch(_) => "FETCH_ERROR",
        }
    }

    /// Returns whether the caller should send the user to sign in.
    #[must_use]
    pub const fn requires_sign_in(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_wraps_message() {
        let err = EngagementError::persistence(&AppError::Database("connection reset".into()));
        assert_eq!(
            err,
            EngagementError::Persistence("Database error: connection reset".to_string())
        );
        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
    }

    #[test]
    fn test_fetch_wraps_message() {
        let err = EngagementError::fetch(&AppError::NotFound("post".into()));
        assert_eq!(err.error_code(), "FETCH_ERROR");
        assert!(err.to_string().contains("Not found: post"));
    }

    #[test]
    fn test_requires_sign_in() {
        assert!(EngagementError::Unauthenticated.requires_sign_in());
        assert!(!EngagementError::ForbiddenOperation("self".into()).requires_sign_in());
    }

    #[test]
    fn test_app_error_codes() {
        assert_eq!(AppError::Conflict("x".into()).error_code(), "CONFLICT");
        assert_eq!(AppError::Database("x".into()).error_code(), "DATABASE_ERROR");
    }
}
