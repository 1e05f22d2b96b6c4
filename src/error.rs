//! Process-level error type.
//!
//! Every failure that reaches `main` is an [`AppError`]: a message for stderr
//! plus the exit code the binary should return. Lower layers keep their own
//! `thiserror` enums and convert at the `app` boundary. Statistics failures
//! are not among them: the report prints them as a diagnostic and the run
//! still succeeds.

use crate::client::ServiceError;

/// Bad arguments or an invalid configuration file.
pub const EXIT_CONFIG: u8 = 2;
/// The model-serving process could not be reached.
pub const EXIT_SERVICE: u8 = 3;
/// A model is missing or the service answered with something unusable.
pub const EXIT_MODEL: u8 = 4;
/// Export or config file IO failed.
pub const EXIT_IO: u8 = 6;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let code = match err {
            ServiceError::ServiceUnavailable { .. } => EXIT_SERVICE,
            ServiceError::ModelNotFound { .. } | ServiceError::InvalidResponse(_) => EXIT_MODEL,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_distinct_exit_codes() {
        let unavailable: AppError = ServiceError::ServiceUnavailable {
            host: "http://localhost:11434".to_string(),
            reason: "connection refused".to_string(),
        }
        .into();
        assert_eq!(unavailable.exit_code(), EXIT_SERVICE);
        assert!(unavailable.message().contains("localhost:11434"));

        let missing: AppError = ServiceError::ModelNotFound {
            model: "gemma3:1b".to_string(),
        }
        .into();
        assert_eq!(missing.exit_code(), EXIT_MODEL);
        assert!(missing.to_string().contains("gemma3:1b"));
    }
}
