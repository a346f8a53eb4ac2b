//! Error types for the rowdoc library.

use thiserror::Error;

/// Main error type for key codec and serializer operations.
///
/// Setup problems (`Config`) and per-request problems (`MalformedId`,
/// `KeyValue`, `InvalidUri`) are kept apart so callers can tell a bad
/// deployment from a bad document id.
#[derive(Error, Debug)]
pub enum DocError {
    /// Configuration error (bad key declaration, unknown column, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document id that this key configuration could not have produced
    #[error("Malformed document id {id:?}: {reason}")]
    MalformedId { id: String, reason: String },

    /// Column value that cannot be rendered in the XML stream
    #[error("Unsupported column {column} ({sql_type}): {reason}")]
    UnsupportedColumn {
        column: String,
        sql_type: String,
        reason: String,
    },

    /// The serializer was handed a cursor without rows
    #[error("No data available: result set has no rows")]
    EmptyResult,

    /// A key column value that cannot be used as part of a document id
    #[error("Invalid value for key column {column}: {message}")]
    KeyValue { column: String, message: String },

    /// Raw document id that is not a usable URL
    #[error("Invalid URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// Row fetch failure reported by the caller's cursor
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// XML output could not be written
    #[error("XML write error: {0}")]
    Xml(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocError {
    /// Create a MalformedId error for the given document id
    pub fn malformed_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        DocError::MalformedId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a KeyValue error
    pub fn key_value(column: impl Into<String>, message: impl Into<String>) -> Self {
        DocError::KeyValue {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an UnsupportedColumn error
    pub fn unsupported_column(
        column: impl Into<String>,
        sql_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DocError::UnsupportedColumn {
            column: column.into(),
            sql_type: sql_type.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by a per-request document id rather than setup.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            DocError::MalformedId { .. } | DocError::KeyValue { .. } | DocError::InvalidUri { .. }
        )
    }

    /// Process exit code used by the CLI for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            DocError::Config(_) | DocError::Yaml(_) => 2,
            DocError::MalformedId { .. } | DocError::KeyValue { .. } | DocError::InvalidUri { .. } => 3,
            DocError::EmptyResult => 4,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for rowdoc operations.
pub type Result<T> = std::result::Result<T, DocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_are_not_config_errors() {
        let err = DocError::malformed_id("1/2/3", "Wrong number of values for primary key");
        assert!(err.is_request_error());
        assert_eq!(err.exit_code(), 3);

        let err = DocError::Config("bad".into());
        assert!(!err.is_request_error());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_format_detailed_includes_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err = DocError::from(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error: missing file"));
    }

    #[test]
    fn test_malformed_id_display() {
        let err = DocError::malformed_id("abc", "not a number");
        assert_eq!(
            err.to_string(),
            "Malformed document id \"abc\": not a number"
        );
    }
}
