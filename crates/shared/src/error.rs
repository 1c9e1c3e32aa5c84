//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Domain errors from the ledger crates collapse into one of these
/// variants at the process boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ledger invariant violated (unbalanced or incomplete postings).
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Conflict (e.g., duplicate document number, exhausted credit).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Invariant(_) => 422,
            Self::Storage(_) | Self::Configuration(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Invariant(_) => "INVARIANT_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(AppError::Invariant(String::new()), 422, "INVARIANT_VIOLATION")]
    #[case(AppError::Storage(String::new()), 500, "STORAGE_ERROR")]
    #[case(AppError::Configuration(String::new()), 500, "CONFIGURATION_ERROR")]
    fn test_error_mapping(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::Conflict("msg".into()).to_string(),
            "Conflict: msg"
        );
        assert_eq!(
            AppError::Storage("msg".into()).to_string(),
            "Storage error: msg"
        );
    }
}
