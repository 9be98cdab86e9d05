//! Error types for annotation format operations.

use thiserror::Error;

use crate::error::EditorError;

/// Errors that can occur while reading or writing annotation files.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image header could not be read to obtain dimensions
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Geometry conversion failed
    #[error(transparent)]
    Editor(#[from] EditorError),
}

/// Why a single annotation line was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    /// Line does not have exactly `tag cx cy w h`
    #[error("expected 5 fields, found {found}")]
    WrongFieldCount {
        /// Number of whitespace-separated fields present
        found: usize,
    },

    /// A coordinate field is not a number
    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber {
        /// Name of the field
        field: &'static str,
        /// Raw text of the field
        value: String,
    },

    /// A coordinate is outside (0, 1]
    #[error("field '{field}' = {value} is outside (0, 1]")]
    OutOfRange {
        /// Name of the field
        field: &'static str,
        /// Parsed value
        value: f32,
    },
}

/// A malformed line that was skipped during decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatWarning {
    /// 1-based line number in the input
    pub line_number: usize,
    /// The offending line as read
    pub line: String,
    /// What was wrong with it
    pub reason: LineError,
}

impl FormatWarning {
    pub fn new(line_number: usize, line: impl Into<String>, reason: LineError) -> Self {
        Self {
            line_number,
            line: line.into(),
            reason,
        }
    }
}

impl std::fmt::Display for FormatWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} ('{}')", self.line_number, self.reason, self.line)
    }
}
