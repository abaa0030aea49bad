//! Error types for the notes client.

use thiserror::Error;

/// Result type for notes client operations.
pub type Result<T> = std::result::Result<T, NotesError>;

/// Notes client errors.
#[derive(Debug, Error)]
pub enum NotesError {
    /// Transport failure (connection refused, timeout, reset)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the notes API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error (missing base URL, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Draft rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Search or sort called while the feature is switched off
    #[error("{0} is disabled for this store")]
    FeatureDisabled(&'static str),

    /// A newer refresh was applied before this one completed
    #[error("refresh #{seq} superseded by a newer request")]
    Superseded { seq: u64 },
}

impl NotesError {
    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NotesError::Api { status, .. } => Some(*status),
            NotesError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the error came from the transport or the remote API
    /// rather than from local validation or configuration.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            NotesError::Network(_) | NotesError::Api { .. } | NotesError::Parse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status() {
        let err = NotesError::Api {
            status: 404,
            message: "Note not found".into(),
        };
        assert_eq!(err.to_string(), "API error (404): Note not found");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_remote());
    }

    #[test]
    fn test_local_errors_are_not_remote() {
        assert!(!NotesError::Validation("title is required".into()).is_remote());
        assert!(!NotesError::FeatureDisabled("search").is_remote());
        assert!(!NotesError::Superseded { seq: 3 }.is_remote());
        assert_eq!(NotesError::Superseded { seq: 3 }.status(), None);
    }
}
