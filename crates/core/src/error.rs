//! Error types for Horus operations.
//!
//! The parsing core never fails: [`parse_raw_input`](crate::parse_raw_input),
//! [`CitationRewriter::rewrite`](crate::CitationRewriter::rewrite) and
//! [`extract_json_string`](crate::extract_json_string) always return a
//! best-effort value. [`HorusError`] covers the boundary helpers around them
//! (feed import, schema correction, decoding caller-supplied source lists).
//!
//! # Example
//!
//! ```rust
//! use horus_core::{HorusError, Result};
//!
//! fn require_schema(model_output: &str) -> Result<String> {
//!     horus_core::extract_json_string(model_output).ok_or(HorusError::SchemaNotFound)
//! }
//!
//! assert!(require_schema("no json here").is_err());
//! ```

use thiserror::Error;

/// Main error type for Horus boundary operations.
#[derive(Error, Debug)]
pub enum HorusError {
    /// Invalid URL provided.
    ///
    /// Returned when a base URL or a caller-supplied source URL cannot be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors.
    ///
    /// Returned for invalid CSS selectors or markup that cannot be rewritten.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// The uploaded feed held no importable posts.
    ///
    /// The message is shown verbatim to the user.
    #[error("لم يتم العثور على أي مقالات في ملف XML")]
    NoArticlesInFeed,

    /// No JSON island could be recovered from the model response.
    #[error("No structured data found in the model response")]
    SchemaNotFound,

    /// A JSON island was found but it is not a schema.org block.
    #[error("Invalid structured data: {0}")]
    InvalidSchema(String),

    /// File read/write errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for HorusError.
pub type Result<T> = std::result::Result<T, HorusError>;
