//! Error types for Segue.

use serde::Serialize;
use thiserror::Error;

/// Maximum number of characters of a diagnostic that is shown to a user or
/// fed back into a prompt.
pub const MAX_DIAGNOSTIC_CHARS: usize = 800;

/// Library-level error type for Segue operations.
#[derive(Error, Debug)]
pub enum SegueError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Article extraction failed: {0}")]
    Extraction(String),

    #[error("Model output failed validation after {attempts} attempt(s): {message}")]
    SchemaValidation { attempts: u32, message: String },

    #[error("Completion provider error: {0}")]
    Provider(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Machine-readable error category, used on the wire as `error.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Extraction,
    SchemaValidation,
    Provider,
    Cache,
    Config,
    Internal,
}

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Input,
    Extraction,
    Generation,
    Storage,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Input => write!(f, "validation"),
            Stage::Extraction => write!(f, "extraction"),
            Stage::Generation => write!(f, "generation"),
            Stage::Storage => write!(f, "storage"),
        }
    }
}

impl SegueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SegueError::Validation(_) => ErrorKind::Validation,
            SegueError::Extraction(_) => ErrorKind::Extraction,
            SegueError::SchemaValidation { .. } => ErrorKind::SchemaValidation,
            SegueError::Provider(_) => ErrorKind::Provider,
            SegueError::Cache(_) | SegueError::Database(_) => ErrorKind::Cache,
            SegueError::Config(_) | SegueError::TomlParse(_) => ErrorKind::Config,
            SegueError::Io(_) | SegueError::Json(_) => ErrorKind::Internal,
        }
    }

    pub fn stage(&self) -> Stage {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Config => Stage::Input,
            ErrorKind::Extraction => Stage::Extraction,
            ErrorKind::SchemaValidation | ErrorKind::Provider => Stage::Generation,
            ErrorKind::Cache | ErrorKind::Internal => Stage::Storage,
        }
    }

    /// Short human-readable message naming the failing stage.
    ///
    /// Raw diagnostics are cut to [`MAX_DIAGNOSTIC_CHARS`].
    pub fn user_message(&self) -> String {
        truncate_chars(&format!("{} failed: {}", self.stage(), self), MAX_DIAGNOSTIC_CHARS)
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Result type alias for Segue operations.
pub type Result<T> = std::result::Result<T, SegueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_user_message_is_bounded() {
        let err = SegueError::Provider("x".repeat(5000));
        let msg = err.user_message();
        assert_eq!(msg.chars().count(), MAX_DIAGNOSTIC_CHARS);
        assert!(msg.starts_with("generation failed"));
    }

    #[test]
    fn test_stage_mapping() {
        assert_eq!(SegueError::Extraction("404".into()).stage(), Stage::Extraction);
        assert_eq!(
            SegueError::SchemaValidation { attempts: 3, message: "bad".into() }.stage(),
            Stage::Generation
        );
        assert_eq!(SegueError::Validation("empty".into()).kind(), ErrorKind::Validation);
    }
}
