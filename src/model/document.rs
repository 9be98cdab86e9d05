//! The ordered box collection for the currently loaded image.

use crate::error::EditorError;

use super::annotation::{BoxAnnotation, BoxId, BoxPatch};
use super::geometry::{Point, Rect, hit_test_body, hit_test_handle};

/// Ordered boxes of one image.
///
/// Order is insertion order, which is both the z-order (last drawn is on
/// top) and the serialization order. All mutation goes through the methods
/// here so id uniqueness stays enforced in one place.
#[derive(Debug, Clone)]
pub struct BoxDocument {
    boxes: Vec<BoxAnnotation>,
    /// Counter for generating unique box IDs.
    next_id: BoxId,
}

impl Default for BoxDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxDocument {
    pub fn new() -> Self {
        Self {
            boxes: Vec::new(),
            next_id: 1,
        }
    }

    /// Build a document from decoded boxes, assigning fresh ids in order.
    pub fn from_boxes<I, S>(boxes: I) -> Self
    where
        I: IntoIterator<Item = (S, Rect)>,
        S: Into<String>,
    {
        let mut doc = Self::new();
        for (tag, rect) in boxes {
            doc.add(tag, rect);
        }
        doc
    }

    /// Append a box and return its new ID.
    pub fn add(&mut self, tag: impl Into<String>, rect: Rect) -> BoxId {
        let id = self.next_id;
        self.next_id += 1;
        self.boxes.push(BoxAnnotation::new(id, tag, rect));
        id
    }

    /// Put a previously removed box back at `index` with its original ID.
    ///
    /// `index` past the end appends. The ID counter stays ahead of every
    /// restored ID so later additions never collide.
    pub fn restore(&mut self, index: usize, annotation: BoxAnnotation) -> Result<(), EditorError> {
        if self.position(annotation.id).is_some() {
            return Err(EditorError::DuplicateId { id: annotation.id });
        }
        if annotation.id >= self.next_id {
            self.next_id = annotation.id + 1;
        }
        let index = index.min(self.boxes.len());
        self.boxes.insert(index, annotation);
        Ok(())
    }

    /// Remove a box, returning its former index and contents.
    pub fn remove(&mut self, id: BoxId) -> Result<(usize, BoxAnnotation), EditorError> {
        let index = self.position(id).ok_or_else(|| EditorError::not_found(id))?;
        Ok((index, self.boxes.remove(index)))
    }

    /// Get a box by ID.
    pub fn get(&self, id: BoxId) -> Option<&BoxAnnotation> {
        self.boxes.iter().find(|b| b.id == id)
    }

    /// Index of a box in document order.
    pub fn position(&self, id: BoxId) -> Option<usize> {
        self.boxes.iter().position(|b| b.id == id)
    }

    /// Apply a patch, returning the box as it was before.
    pub fn update(&mut self, id: BoxId, patch: BoxPatch) -> Result<BoxAnnotation, EditorError> {
        let annotation = self
            .boxes
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| EditorError::not_found(id))?;
        let previous = annotation.clone();
        if let Some(tag) = patch.tag {
            annotation.tag = tag;
        }
        if let Some(rect) = patch.rect {
            annotation.rect = rect;
        }
        Ok(previous)
    }

    /// Snapshot of all boxes in document order.
    pub fn list(&self) -> Vec<BoxAnnotation> {
        self.boxes.clone()
    }

    /// Iterate boxes in document order without copying.
    pub fn iter(&self) -> impl Iterator<Item = &BoxAnnotation> {
        self.boxes.iter()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Topmost box whose body contains `point`.
    pub fn topmost_at(&self, point: &Point) -> Option<BoxId> {
        self.boxes
            .iter()
            .rev()
            .find(|b| hit_test_body(point, &b.rect))
            .map(|b| b.id)
    }

    /// Topmost box whose body or any handle is under `point`.
    pub fn topmost_hit(&self, point: &Point, handle_radius: f32) -> Option<BoxId> {
        self.boxes
            .iter()
            .rev()
            .find(|b| {
                hit_test_body(point, &b.rect)
                    || hit_test_handle(point, &b.rect, handle_radius).is_some()
            })
            .map(|b| b.id)
    }
}
