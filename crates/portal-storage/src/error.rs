//! Storage error types for the portal storage abstraction layer.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of record (`client`, `project`, ...).
        kind: &'static str,
        /// ID that was looked up.
        id: String,
    },

    /// A record refers to a parent that does not exist.
    #[error("Invalid reference: {kind} {id} does not exist")]
    InvalidReference {
        /// Kind of the referenced parent.
        kind: &'static str,
        /// ID of the referenced parent.
        id: String,
    },

    /// The input data is invalid.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of why the input is invalid.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates a new `InvalidReference` error.
    #[must_use]
    pub fn invalid_reference(kind: &'static str, id: impl Into<String>) -> Self {
        Self::InvalidReference {
            kind,
            id: id.into(),
        }
    }

    /// Creates a new `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the caller can fix the error by changing the request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            StorageError::not_found("project", "p-1").to_string(),
            "project not found: p-1"
        );
        assert_eq!(
            StorageError::invalid_reference("client", "c-9").to_string(),
            "Invalid reference: client c-9 does not exist"
        );
    }

    #[test]
    fn test_predicates() {
        assert!(StorageError::not_found("client", "x").is_not_found());
        assert!(!StorageError::invalid_input("x").is_not_found());
        assert!(StorageError::invalid_input("x").is_client_error());
        assert!(!StorageError::internal("x").is_client_error());
    }
}
