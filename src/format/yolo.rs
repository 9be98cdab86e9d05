//! YOLO TXT format implementation.
//!
//! One text file per image, one line per box:
//!
//! ```text
//! <tag> <cx> <cy> <w> <h>
//! ```
//!
//! The tag is written as text (not a class index). Coordinates are box
//! center and size divided by the image size, each in `(0, 1]`.

use crate::constants::{ANNOTATION_EXTENSION, DEFAULT_PRECISION, MAX_PRECISION, MIN_PRECISION};
use crate::format::error::{FormatError, FormatWarning, LineError};
use crate::format::traits::{AnnotationFormat, DecodeResult};
use crate::model::{BoxDocument, ImageSize, NormalizedBox, Rect};

const FIELD_NAMES: [&str; 4] = ["cx", "cy", "w", "h"];

/// YOLO TXT format with tag labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YoloFormat {
    /// Decimal places written per coordinate
    precision: usize,
}

impl Default for YoloFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl YoloFormat {
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_PRECISION)
    }

    /// Precision is clamped into `MIN_PRECISION..=MAX_PRECISION`.
    pub fn with_precision(precision: usize) -> Self {
        let clamped = precision.clamp(MIN_PRECISION, MAX_PRECISION);
        if clamped != precision {
            log::warn!("Precision {} out of range, using {}", precision, clamped);
        }
        Self { precision: clamped }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Format one normalized box as an annotation line.
    ///
    /// Values that would print as zero are written as the smallest printable
    /// step so the line still decodes.
    pub fn format_line(&self, tag: &str, norm: &NormalizedBox) -> String {
        let prec = self.precision;
        let step = 10f32.powi(-(prec as i32));
        let [cx, cy, w, h] = [norm.cx, norm.cy, norm.width, norm.height].map(|v| v.max(step));
        format!("{} {:.prec$} {:.prec$} {:.prec$} {:.prec$}", tag, cx, cy, w, h)
    }
}

impl AnnotationFormat for YoloFormat {
    fn id(&self) -> &'static str {
        "yolo"
    }

    fn display_name(&self) -> &'static str {
        "YOLO (TXT)"
    }

    fn extension(&self) -> &'static str {
        ANNOTATION_EXTENSION
    }

    fn encode(&self, doc: &BoxDocument, image: ImageSize) -> Result<Vec<String>, FormatError> {
        let lines: Vec<String> = doc
            .iter()
            .map(|b| self.format_line(&b.tag, &image.normalize(&b.rect)))
            .collect();

        log::debug!("Encoded {} boxes as YOLO lines", lines.len());
        Ok(lines)
    }

    fn decode(&self, lines: &[String], image: ImageSize) -> DecodeResult {
        let mut result = DecodeResult::default();

        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            match parse_yolo_line(line) {
                Ok((tag, norm)) => {
                    let rect = to_image_rect(&norm, image);
                    result.boxes.push((tag.to_string(), rect));
                }
                Err(reason) => {
                    let warning = FormatWarning::new(idx + 1, line, reason);
                    log::warn!("Skipping annotation {}", warning);
                    result.warnings.push(warning);
                }
            }
        }

        log::info!(
            "Decoded {} boxes ({} lines skipped)",
            result.boxes.len(),
            result.warnings.len()
        );
        result
    }
}

/// Parse a single YOLO annotation line into its tag and normalized box.
fn parse_yolo_line(line: &str) -> Result<(&str, NormalizedBox), LineError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 5 {
        return Err(LineError::WrongFieldCount { found: parts.len() });
    }

    let mut values = [0.0f32; 4];
    for (slot, (field, text)) in values
        .iter_mut()
        .zip(FIELD_NAMES.into_iter().zip(&parts[1..]))
    {
        let value: f32 = text.parse().map_err(|_| LineError::InvalidNumber {
            field,
            value: text.to_string(),
        })?;
        if !(value > 0.0 && value <= 1.0) {
            return Err(LineError::OutOfRange { field, value });
        }
        *slot = value;
    }

    let [cx, cy, w, h] = values;
    Ok((parts[0], NormalizedBox::new(cx, cy, w, h)))
}

fn to_image_rect(norm: &NormalizedBox, image: ImageSize) -> Rect {
    let rect = image.denormalize(norm);
    let clamped = image.clamp(&rect);
    if clamped != rect {
        log::debug!("Clamped decoded box {:?} to {:?}", rect, clamped);
    }
    clamped
}
