//! Box annotation types.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Unique identifier for a box within one document.
pub type BoxId = u32;

/// A single tagged box on an image (pixel coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    /// Unique identifier, never reused after deletion.
    pub id: BoxId,
    /// Label written as the first field of the annotation line.
    pub tag: String,
    /// Geometry in image pixel space.
    pub rect: Rect,
}

impl BoxAnnotation {
    pub fn new(id: BoxId, tag: impl Into<String>, rect: Rect) -> Self {
        Self {
            id,
            tag: tag.into(),
            rect,
        }
    }
}

/// Partial update applied through [`super::BoxDocument::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxPatch {
    /// Replacement tag
    pub tag: Option<String>,
    /// Replacement geometry
    pub rect: Option<Rect>,
}

impl BoxPatch {
    /// Patch that only replaces the geometry.
    pub fn rect(rect: Rect) -> Self {
        Self {
            rect: Some(rect),
            ..Default::default()
        }
    }

    /// Patch that only replaces the tag.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Default::default()
        }
    }
}
