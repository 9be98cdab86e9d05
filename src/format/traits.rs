//! Trait definitions for annotation format implementations.

use crate::format::error::{FormatError, FormatWarning};
use crate::model::{BoxDocument, ImageSize, Rect};

/// Trait for per-image annotation codecs.
///
/// A codec converts between a [`BoxDocument`] and the ordered lines of one
/// image's annotation file. File I/O is handled by the caller.
pub trait AnnotationFormat {
    /// Unique identifier for this format (e.g., "yolo").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// File extension of the per-image annotation file.
    fn extension(&self) -> &'static str;

    /// Serialize the document, one line per box in document order.
    fn encode(&self, doc: &BoxDocument, image: ImageSize) -> Result<Vec<String>, FormatError>;

    /// Parse annotation lines. Malformed lines are skipped and reported.
    fn decode(&self, lines: &[String], image: ImageSize) -> DecodeResult;
}

/// Result of decoding an annotation file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeResult {
    /// Decoded boxes in file order (tag, pixel geometry).
    pub boxes: Vec<(String, Rect)>,

    /// Lines that were skipped.
    pub warnings: Vec<FormatWarning>,
}

impl DecodeResult {
    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Build a fresh document from the decoded boxes.
    pub fn to_document(&self) -> BoxDocument {
        BoxDocument::from_boxes(self.boxes.iter().map(|(tag, rect)| (tag.as_str(), *rect)))
    }
}
