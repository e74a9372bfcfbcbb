//! Error types for port operations.

/// Record storage errors with the failing operation for tracing.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored column could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_names_operation() {
        let err = RepoError::database("records.insert", "disk I/O error");
        assert_eq!(
            err.to_string(),
            "Database error in records.insert: disk I/O error"
        );
    }

    #[test]
    fn serialization_error_keeps_message() {
        let err = RepoError::serialization("bad timestamp 'x'");
        assert_eq!(err.to_string(), "Serialization error: bad timestamp 'x'");
    }
}
