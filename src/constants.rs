//! Global constants for the box annotation engine

/// Radius (in image pixels) within which a pointer grabs a resize handle.
pub const HANDLE_HIT_RADIUS: f32 = 6.0;

/// Minimum width/height (in image pixels) for a box to be committed.
pub const MIN_BOX_SIZE: f32 = 1.0;

/// Decimal places written for each normalized coordinate.
pub const DEFAULT_PRECISION: usize = 6;

/// Fewest decimal places accepted for annotation output.
pub const MIN_PRECISION: usize = 4;

/// Most decimal places accepted for annotation output.
pub const MAX_PRECISION: usize = 9;

/// Tag assigned to new boxes when nothing else is configured.
pub const DEFAULT_TAG: &str = "Object";

/// Tags offered to the user out of the box.
pub const DEFAULT_TAGS: &[&str] = &["Object", "Person", "Car", "Dog", "Cat"];

/// Image file extensions recognised when listing a folder.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Extension of the per-image annotation file.
pub const ANNOTATION_EXTENSION: &str = "txt";
