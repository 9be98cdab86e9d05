//! Error types for the editing engine.

use thiserror::Error;

use crate::model::BoxId;

/// Errors raised by geometry conversion and document mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Image width or height was zero or negative
    #[error("Invalid image dimensions {width}x{height}: both must be positive")]
    InvalidDimension {
        /// Offending width
        width: f32,
        /// Offending height
        height: f32,
    },

    /// A mutation referenced a box that is not in the document.
    ///
    /// The engine only hands out ids it created, so this means the caller
    /// and the document have drifted apart.
    #[error("Box {id} not found in document")]
    NotFound {
        /// The unknown id
        id: BoxId,
    },

    /// A box was restored under an id the document already holds
    #[error("Box {id} already exists in document")]
    DuplicateId {
        /// The clashing id
        id: BoxId,
    },

    /// Tag is empty or contains whitespace and cannot be written as one field
    #[error("Invalid tag '{tag}': tags must be non-empty and contain no whitespace")]
    InvalidTag {
        /// The rejected tag
        tag: String,
    },
}

impl EditorError {
    /// Create an invalid dimension error.
    pub fn invalid_dimension(width: f32, height: f32) -> Self {
        Self::InvalidDimension { width, height }
    }

    /// Create a not found error.
    pub fn not_found(id: BoxId) -> Self {
        Self::NotFound { id }
    }

    /// Create an invalid tag error.
    pub fn invalid_tag(tag: impl Into<String>) -> Self {
        Self::InvalidTag { tag: tag.into() }
    }
}

/// Check that a tag can be stored as a single whitespace-free field.
pub fn validate_tag(tag: &str) -> Result<(), EditorError> {
    if tag.is_empty() || tag.chars().any(char::is_whitespace) {
        return Err(EditorError::invalid_tag(tag));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tag() {
        assert!(validate_tag("person").is_ok());
        assert!(validate_tag("traffic_light").is_ok());
        assert!(validate_tag("").is_err());
        assert!(validate_tag("traffic light").is_err());
        assert!(validate_tag("tab\tbed").is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = EditorError::invalid_dimension(0.0, 480.0);
        assert!(err.to_string().contains("0x480"));

        let err = EditorError::not_found(7);
        assert_eq!(err.to_string(), "Box 7 not found in document");
    }
}
