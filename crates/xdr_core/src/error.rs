use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape used by the store, workspace and view layers.
///
/// Network, authorization and validation failures from the entity store all arrive as this
/// type; callers distinguish them only by `code` when they need to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = AppError::new("STORE_NOT_FOUND", "Record not found").with_details("id=abc");
        assert_eq!(err.to_string(), "[STORE_NOT_FOUND] Record not found");
        assert_eq!(err.details.as_deref(), Some("id=abc"));
        assert!(!err.retryable);
    }
}
