//! Centralized error handling for idmd.
//!
//! Every library operation returns [`Result<T>`], whose error side is the
//! [`IdmdError`] enum. The variants split into two groups:
//!
//! - **Domain errors** raised by the column, replacement, generator and chart
//!   operations (`ColumnNotFound`, `UnsupportedPolicy`, `EmptyInput`, ...).
//!   These are caller mistakes and carry a message naming the offending
//!   column or parameter.
//! - **Infrastructure errors** converted from the crates underneath
//!   (Polars, plotters, `std::io`, `serde_json`).
//!
//! ```
//! use idmd::error::IdmdError;
//!
//! fn describe(err: &IdmdError) -> &'static str {
//!     match err {
//!         IdmdError::ColumnNotFound(_) | IdmdError::InvalidColumn(_) => "bad column",
//!         IdmdError::EmptyInput(_) => "nothing selected",
//!         _ => "other",
//!     }
//! }
//! ```
//!
//! ## Context Extension Trait
//!
//! [`ResultExt`] adds `.context()` to any `Result` whose error converts into
//! [`IdmdError`]:
//!
//! ```no_run
//! use idmd::error::ResultExt as _;
//!
//! fn read_ops() -> idmd::error::Result<String> {
//!     std::fs::read_to_string("ops.json").context("Failed to read operations")
//! }
//! ```

use std::fmt;

/// Main error type for idmd operations.
#[derive(Debug)]
pub enum IdmdError {
    /// A referenced column is not present in the table
    ColumnNotFound(String),

    /// The target column of a replacement does not exist
    InvalidColumn(String),

    /// The requested statistic or selector does not apply to the column type
    UnsupportedPolicy(String),

    /// Every value was masked, so no replacement statistic can be computed
    EmptyRetainedSet(String),

    /// Generator shape out of domain
    InvalidShape(String),

    /// Generator distribution parameters out of domain
    InvalidParams(String),

    /// An empty selection or table where at least one item is required
    EmptyInput(String),

    /// File extension the loader does not understand
    UnsupportedFormat(String),

    /// Data processing errors (Polars, parsing, etc.)
    DataProcessing(String),

    /// Chart rendering errors
    Render(String),

    /// I/O errors
    Io(std::io::Error),

    /// Configuration errors
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for IdmdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnNotFound(name) => write!(f, "Column not found: {name}"),
            Self::InvalidColumn(name) => write!(f, "Invalid column: {name}"),
            Self::UnsupportedPolicy(msg) => write!(f, "Unsupported policy: {msg}"),
            Self::EmptyRetainedSet(msg) => write!(f, "No retained values: {msg}"),
            Self::InvalidShape(msg) => write!(f, "Invalid shape: {msg}"),
            Self::InvalidParams(msg) => write!(f, "Invalid parameters: {msg}"),
            Self::EmptyInput(msg) => write!(f, "Empty input: {msg}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported file format: {ext}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for IdmdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IdmdError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for IdmdError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for IdmdError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for IdmdError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<IdmdError> for String {
    fn from(err: IdmdError) -> Self {
        err.to_string()
    }
}

/// Result type alias for idmd operations.
pub type Result<T> = std::result::Result<T, IdmdError>;

/// Maps any displayable plotters error into [`IdmdError::Render`].
pub(crate) fn render_err(err: impl fmt::Display) -> IdmdError {
    IdmdError::Render(err.to_string())
}

/// Prefixes the error of any convertible `Result` with a message.
pub trait ResultExt<T> {
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Like [`ResultExt::context`], building the message only on error.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<IdmdError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: IdmdError = e.into();
            IdmdError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: IdmdError = e.into();
            IdmdError::Other(format!("{}: {err}", f()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IdmdError::ColumnNotFound("price".to_owned());
        assert_eq!(err.to_string(), "Column not found: price");
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = IdmdError::EmptyInput("no columns selected".to_owned());
        let s: String = err.into();
        assert_eq!(s, "Empty input: no columns selected");
    }

    #[test]
    fn test_polars_error_conversion() {
        let err: IdmdError =
            polars::error::PolarsError::ColumnNotFound("x".into()).into();
        assert!(matches!(err, IdmdError::DataProcessing(_)));
    }

    #[test]
    fn test_context_keeps_source_message() {
        let parsed: std::result::Result<Vec<String>, serde_json::Error> =
            serde_json::from_str("[\"a\",");
        let err = parsed.context("Failed to deserialize pipeline").unwrap_err();

        assert!(matches!(err, IdmdError::Other(_)));
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to deserialize pipeline: "));
        assert!(msg.contains("JSON error"), "{msg}");
    }
}
