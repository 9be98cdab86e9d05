//! Data models for the box editor.

mod annotation;
mod document;
mod geometry;

pub use annotation::{BoxAnnotation, BoxId, BoxPatch};
pub use document::BoxDocument;
pub use geometry::{
    HandleKind, ImageSize, NormalizedBox, Point, Rect, clamp_to_image, denormalize,
    hit_test_body, hit_test_handle, normalize,
};
