//! Error types for SEG-Y decoding.
//!
//! Errors come in two tiers. Structural errors are raised while a stream is
//! being opened (the text or binary header cannot be read, the sample format
//! is unknown) and mean the source is not a usable SEG-Y file. Transport
//! errors during trace access never surface here: the stream logs them,
//! closes its source and reports "no data" instead.
//!
//! ## Error Categories
//!
//! - **File Errors**: Problems opening or reading the underlying file
//! - **Format Errors**: The source is not SEG-Y, or uses an unknown sample code
//! - **Layout Errors**: A field layout is malformed (overlapping or out of bounds)
//! - **Codec Errors**: A buffer is too short, or a value does not fit its field
//! - **Config Errors**: A YAML format description could not be loaded
//!
//! ## Helper Constructors
//!
//! ```rust
//! use sigrun::SegyError;
//! use std::path::PathBuf;
//!
//! let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
//! let file_error = SegyError::file_error(PathBuf::from("/data/line_001.sgy"), io_err);
//! assert!(file_error.is_recoverable());
//!
//! let layout_error = SegyError::layout("trace", "field 'inline' overlaps 'crossline'");
//! for suggestion in layout_error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for SEG-Y operations.
pub type Result<T, E = SegyError> = std::result::Result<T, E>;

/// Main error type for SEG-Y operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SegyError {
    #[error("SEG-Y file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Looks like the source is not a SEG-Y file ({context}): {details}")]
    NotSegy { context: String, details: String },

    #[error("Unsupported data sample code {code}")]
    UnsupportedSampleFormat { code: i32 },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Invalid {layout} field layout: {details}")]
    Layout { layout: String, details: String },

    #[error("Value {value} does not fit field '{field}'")]
    FieldOverflow { field: String, value: i64 },

    #[error("Field '{field}' not found in header layout")]
    FieldNotFound { field: String },

    #[error("Format configuration error: {details}")]
    Config { details: String },

    #[error("SEG-Y stream is already closed")]
    Closed,
}

impl SegyError {
    /// Returns whether retrying the operation (or opening a fresh stream) can succeed
    /// without changing the input.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SegyError::File { .. } => true,
            SegyError::Closed => true,
            SegyError::NotSegy { .. } => false,
            SegyError::UnsupportedSampleFormat { .. } => false,
            SegyError::Parse { .. } => false,
            SegyError::Layout { .. } => false,
            SegyError::FieldOverflow { .. } => false,
            SegyError::FieldNotFound { .. } => false,
            SegyError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SegyError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
                "Retry once the file is no longer being written",
            ],
            SegyError::NotSegy { .. } => vec![
                "Verify the file is SEG-Y and not SU or a vendor format",
                "Check the file is at least 3600 bytes long",
            ],
            SegyError::UnsupportedSampleFormat { .. } => vec![
                "Check the data sample code at binary header bytes 3225-3226",
                "Override the binary layout if the code lives at a non-standard offset",
            ],
            SegyError::Parse { .. } => vec![
                "Verify source data integrity",
                "Check the header buffer matches the layout size",
            ],
            SegyError::Layout { .. } => vec![
                "Check field ranges do not overlap",
                "Keep every range inside the declared header size",
                "Use 2 or 4 byte widths for integer fields",
            ],
            SegyError::FieldOverflow { .. } => vec![
                "Use a 4 byte field for values outside the i16 range",
                "Check the value being encoded",
            ],
            SegyError::FieldNotFound { .. } => vec![
                "Check field name spelling",
                "Add the field to the format configuration",
            ],
            SegyError::Config { .. } => vec![
                "Check the YAML syntax of the format description",
                "Verify every field has name, start and end",
            ],
            SegyError::Closed => vec![
                "Open a new stream on the source",
                "Avoid reading after a short read closed the stream",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        SegyError::File { path, source }
    }

    /// Helper constructor for structural "not this format" errors.
    pub fn not_segy(context: impl Into<String>, details: impl Into<String>) -> Self {
        SegyError::NotSegy { context: context.into(), details: details.into() }
    }

    /// Helper constructor for layout validation errors.
    pub fn layout(layout: impl Into<String>, details: impl Into<String>) -> Self {
        SegyError::Layout { layout: layout.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        SegyError::Config { details: details.into() }
    }
}

impl From<std::io::Error> for SegyError {
    fn from(err: std::io::Error) -> Self {
        SegyError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
