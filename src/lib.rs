//! boxtag - Bounding box annotation engine
//!
//! Draw, move, resize, delete and tag rectangular boxes over an image, with
//! full undo/redo, and persist them as normalized `tag cx cy w h` lines.
//!
//! The engine is UI-agnostic: an [`AnnotationSession`] consumes pointer
//! events and discrete commands and exposes boxes, selection and a live
//! preview for whatever renders them.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod interaction;
pub mod model;
pub mod session;
pub mod storage;
pub mod undo;

pub use config::{ConfigError, EditorConfig, LogLevel};
pub use error::EditorError;
pub use format::{AnnotationFormat, FormatError, FormatWarning, YoloFormat};
pub use interaction::{EditState, PointerEvent, PointerEventKind, Preview};
pub use model::{BoxAnnotation, BoxDocument, BoxId, ImageSize, Point, Rect};
pub use session::{AnnotationSession, SessionSettings};
pub use undo::{Command, UndoStack};
