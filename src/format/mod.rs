//! Annotation file formats.
//!
//! A format turns a [`BoxDocument`](crate::model::BoxDocument) into the lines
//! of a per-image annotation file and back. Reading and writing the file
//! itself is left to the caller (see [`crate::storage`] on native builds).
//!
//! ## Supported Formats
//!
//! - **YOLO TXT**: `<tag> <cx> <cy> <w> <h>` per line, coordinates normalized
//!
//! ## Usage
//!
//! ```rust,ignore
//! use boxtag::format::{AnnotationFormat, YoloFormat};
//!
//! let format = YoloFormat::new();
//! let lines = format.encode(&document, image)?;
//! let decoded = format.decode(&lines, image);
//! ```

mod error;
mod traits;
mod yolo;


pub use error::{FormatError, FormatWarning, LineError};
pub use traits::{AnnotationFormat, DecodeResult};
pub use yolo::YoloFormat;
