//! Geometry primitives and pure helpers for box editing.
//!
//! Everything here works in image pixel space except [`NormalizedBox`],
//! which is the center-based, image-relative form written to disk.

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp the point into `[0, width] x [0, height]`.
    pub fn clamped(&self, image: ImageSize) -> Self {
        Self {
            x: self.x.clamp(0.0, image.width()),
            y: self.y.clamp(0.0, image.height()),
        }
    }
}

/// Dimensions of the loaded image, guaranteed positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    width: f32,
    height: f32,
}

impl ImageSize {
    /// Validate and wrap image dimensions.
    pub fn new(width: f32, height: f32) -> Result<Self, EditorError> {
        check_dimensions(width, height)?;
        Ok(Self { width, height })
    }

    /// Build from integer pixel dimensions as reported by an image decoder.
    pub fn from_pixels(width: u32, height: u32) -> Result<Self, EditorError> {
        Self::new(width as f32, height as f32)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Normalize a rectangle against this image.
    pub fn normalize(&self, rect: &Rect) -> NormalizedBox {
        NormalizedBox {
            cx: (rect.x + rect.width / 2.0) / self.width,
            cy: (rect.y + rect.height / 2.0) / self.height,
            width: rect.width / self.width,
            height: rect.height / self.height,
        }
    }

    /// Convert a normalized box back to pixel space for this image.
    pub fn denormalize(&self, norm: &NormalizedBox) -> Rect {
        Rect {
            x: (norm.cx - norm.width / 2.0) * self.width,
            y: (norm.cy - norm.height / 2.0) * self.height,
            width: norm.width * self.width,
            height: norm.height * self.height,
        }
    }

    /// Clamp a rectangle into this image, see [`clamp_to_image`].
    pub fn clamp(&self, rect: &Rect) -> Rect {
        clamp_to_image(rect, self.width, self.height)
    }
}

fn check_dimensions(width: f32, height: f32) -> Result<(), EditorError> {
    // `!(w > 0)` also rejects NaN
    if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
        return Err(EditorError::invalid_dimension(width, height));
    }
    Ok(())
}

/// An axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner X coordinate
    pub x: f32,
    /// Top-left corner Y coordinate
    pub y: f32,
    /// Width of the box
    pub width: f32,
    /// Height of the box
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle spanning two arbitrary corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::from_edges(p1.x, p1.y, p2.x, p2.y)
    }

    /// Create a rectangle from edge coordinates in any order.
    pub fn from_edges(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Get the top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the center point of the box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside the box (boundary inclusive).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Same size, new top-left corner.
    pub fn with_origin(&self, origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            ..*self
        }
    }

    /// Whether both sides are strictly larger than `min_size`.
    pub fn exceeds(&self, min_size: f32) -> bool {
        self.width > min_size && self.height > min_size
    }

    /// Component-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Rect, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }
}

/// Box geometry as fractions of the image size, center based (YOLO style).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub cx: f32,
    pub cy: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedBox {
    pub fn new(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
        }
    }
}

/// Convert a pixel-space rectangle to normalized center coordinates.
pub fn normalize(rect: &Rect, img_w: f32, img_h: f32) -> Result<NormalizedBox, EditorError> {
    Ok(ImageSize::new(img_w, img_h)?.normalize(rect))
}

/// Inverse of [`normalize`].
pub fn denormalize(norm: &NormalizedBox, img_w: f32, img_h: f32) -> Result<Rect, EditorError> {
    Ok(ImageSize::new(img_w, img_h)?.denormalize(norm))
}

/// Move a rectangle back inside `[0, img_w] x [0, img_h]`.
///
/// Each axis is handled on its own: a box that fits is translated, a box
/// larger than the image on that axis is shrunk to the full extent.
pub fn clamp_to_image(rect: &Rect, img_w: f32, img_h: f32) -> Rect {
    let (x, width) = clamp_axis(rect.x, rect.width, img_w);
    let (y, height) = clamp_axis(rect.y, rect.height, img_h);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn clamp_axis(start: f32, len: f32, extent: f32) -> (f32, f32) {
    if len >= extent {
        (0.0, extent)
    } else {
        (start.clamp(0.0, extent - len), len)
    }
}

// ============================================================================
// Handles
// ============================================================================

/// One of the eight resize handles on a box boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl HandleKind {
    /// All handles, clockwise from the top-left corner.
    pub const ALL: [HandleKind; 8] = [
        HandleKind::TopLeft,
        HandleKind::Top,
        HandleKind::TopRight,
        HandleKind::Right,
        HandleKind::BottomRight,
        HandleKind::Bottom,
        HandleKind::BottomLeft,
        HandleKind::Left,
    ];

    /// Corners resize on both axes, edges on one.
    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            HandleKind::TopLeft
                | HandleKind::TopRight
                | HandleKind::BottomRight
                | HandleKind::BottomLeft
        )
    }

    pub fn moves_left(&self) -> bool {
        matches!(
            self,
            HandleKind::TopLeft | HandleKind::Left | HandleKind::BottomLeft
        )
    }

    pub fn moves_right(&self) -> bool {
        matches!(
            self,
            HandleKind::TopRight | HandleKind::Right | HandleKind::BottomRight
        )
    }

    pub fn moves_top(&self) -> bool {
        matches!(
            self,
            HandleKind::TopLeft | HandleKind::Top | HandleKind::TopRight
        )
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(
            self,
            HandleKind::BottomLeft | HandleKind::Bottom | HandleKind::BottomRight
        )
    }

    /// Position of this handle on the given rectangle.
    pub fn position(&self, rect: &Rect) -> Point {
        let center = rect.center();
        let x = if self.moves_left() {
            rect.left()
        } else if self.moves_right() {
            rect.right()
        } else {
            center.x
        };
        let y = if self.moves_top() {
            rect.top()
        } else if self.moves_bottom() {
            rect.bottom()
        } else {
            center.y
        };
        Point::new(x, y)
    }

    /// Recompute a rectangle with this handle dragged to `point`.
    ///
    /// Edges the handle does not own stay where they were in `original`.
    /// Dragging past the opposite edge flips the box instead of collapsing it.
    pub fn drag(&self, original: &Rect, point: Point) -> Rect {
        let mut left = original.left();
        let mut right = original.right();
        let mut top = original.top();
        let mut bottom = original.bottom();

        if self.moves_left() {
            left = point.x;
        }
        if self.moves_right() {
            right = point.x;
        }
        if self.moves_top() {
            top = point.y;
        }
        if self.moves_bottom() {
            bottom = point.y;
        }

        Rect::from_edges(left, top, right, bottom)
    }
}

/// Find the handle of `rect` grabbed by `point`, if any.
///
/// Among handles within `radius`, a corner always wins over an edge; within
/// each class the nearest one is returned.
pub fn hit_test_handle(point: &Point, rect: &Rect, radius: f32) -> Option<HandleKind> {
    let mut corner: Option<(HandleKind, f32)> = None;
    let mut edge: Option<(HandleKind, f32)> = None;

    for handle in HandleKind::ALL {
        let distance = handle.position(rect).distance_to(point);
        if distance > radius {
            continue;
        }
        let slot = if handle.is_corner() {
            &mut corner
        } else {
            &mut edge
        };
        if slot.is_none_or(|(_, best)| distance < best) {
            *slot = Some((handle, distance));
        }
    }

    corner.or(edge).map(|(handle, _)| handle)
}

/// Boundary-inclusive containment test used for select, move and delete.
pub fn hit_test_body(point: &Point, rect: &Rect) -> bool {
    rect.contains(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_rect_from_corners() {
        let rect = Rect::from_corners(Point::new(10.0, 20.0), Point::new(50.0, 80.0));
        assert_eq!(rect, Rect::new(10.0, 20.0, 40.0, 60.0));

        // Test with reversed corners
        let rect2 = Rect::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(rect, rect2);
    }

    #[test]
    fn test_rect_contains_is_inclusive() {
        let rect = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert!(rect.contains(&Point::new(50.0, 50.0)));
        assert!(rect.contains(&Point::new(10.0, 10.0)));
        assert!(rect.contains(&Point::new(110.0, 110.0)));
        assert!(!rect.contains(&Point::new(5.0, 50.0)));
        assert!(!rect.contains(&Point::new(50.0, 110.5)));
    }

    #[test]
    fn test_normalize_scenario() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        let norm = normalize(&rect, 1000.0, 500.0).unwrap();
        assert!((norm.cx - 0.2).abs() < EPS);
        assert!((norm.cy - 0.3).abs() < EPS);
        assert!((norm.width - 0.2).abs() < EPS);
        assert!((norm.height - 0.2).abs() < EPS);
    }

    #[test]
    fn test_denormalize_scenario() {
        let rect = denormalize(&NormalizedBox::new(0.5, 0.5, 0.2, 0.4), 1000.0, 500.0).unwrap();
        assert!(rect.approx_eq(&Rect::new(400.0, 150.0, 200.0, 200.0), 1e-3));
    }

    #[test]
    fn test_normalize_round_trip() {
        let sizes = [(640.0, 480.0), (1920.0, 1080.0), (37.0, 911.0)];
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(12.5, 7.25, 3.0, 200.0),
            Rect::new(30.0, 400.0, 5.0, 11.0),
        ];
        for (w, h) in sizes {
            for rect in rects {
                let back = denormalize(&normalize(&rect, w, h).unwrap(), w, h).unwrap();
                assert!(back.approx_eq(&rect, 1e-3), "{:?} -> {:?}", rect, back);
            }
        }
    }

    #[test]
    fn test_invalid_dimensions() {
        let rect = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            normalize(&rect, 0.0, 10.0),
            Err(EditorError::InvalidDimension { .. })
        ));
        assert!(normalize(&rect, 10.0, -1.0).is_err());
        assert!(normalize(&rect, f32::NAN, 10.0).is_err());
        assert!(denormalize(&NormalizedBox::new(0.5, 0.5, 0.1, 0.1), 10.0, 0.0).is_err());
        assert!(ImageSize::from_pixels(0, 100).is_err());
        assert!(ImageSize::from_pixels(100, 100).is_ok());
    }

    #[test]
    fn test_clamp_translates_when_fitting() {
        let rect = Rect::new(-20.0, 90.0, 50.0, 30.0);
        let clamped = clamp_to_image(&rect, 100.0, 100.0);
        assert_eq!(clamped, Rect::new(0.0, 70.0, 50.0, 30.0));
    }

    #[test]
    fn test_clamp_shrinks_oversized_axis() {
        let rect = Rect::new(-10.0, 10.0, 150.0, 20.0);
        let clamped = clamp_to_image(&rect, 100.0, 100.0);
        assert_eq!(clamped, Rect::new(0.0, 10.0, 100.0, 20.0));
    }

    #[test]
    fn test_handle_positions() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(HandleKind::TopLeft.position(&rect), Point::new(0.0, 0.0));
        assert_eq!(HandleKind::Top.position(&rect), Point::new(50.0, 0.0));
        assert_eq!(HandleKind::Right.position(&rect), Point::new(100.0, 25.0));
        assert_eq!(
            HandleKind::BottomLeft.position(&rect),
            Point::new(0.0, 50.0)
        );
    }

    #[test]
    fn test_hit_test_handle_nearest() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            hit_test_handle(&Point::new(98.0, 101.0), &rect, 6.0),
            Some(HandleKind::BottomRight)
        );
        assert_eq!(
            hit_test_handle(&Point::new(50.0, 3.0), &rect, 6.0),
            Some(HandleKind::Top)
        );
        assert_eq!(hit_test_handle(&Point::new(50.0, 50.0), &rect, 6.0), None);
    }

    #[test]
    fn test_hit_test_corner_beats_edge() {
        // Tiny box: the top edge midpoint is closer, but the corner is in range too
        let rect = Rect::new(0.0, 0.0, 8.0, 8.0);
        let point = Point::new(3.0, 0.0);
        assert_eq!(
            hit_test_handle(&point, &rect, 5.0),
            Some(HandleKind::TopLeft)
        );
    }

    #[test]
    fn test_handle_drag_flips() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        let dragged = HandleKind::BottomRight.drag(&rect, Point::new(40.0, 50.0));
        assert_eq!(dragged, Rect::new(10.0, 10.0, 30.0, 40.0));

        // Crossing the anchor flips instead of collapsing
        let flipped = HandleKind::Right.drag(&rect, Point::new(0.0, 999.0));
        assert_eq!(flipped, Rect::new(0.0, 10.0, 10.0, 20.0));
    }
}
