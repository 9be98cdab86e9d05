//! Editing session for a single image.
//!
//! An [`AnnotationSession`] owns the box document, the command history and
//! the gesture state for the image that is currently open. Collaborators feed
//! it pointer events and discrete commands and read back boxes, selection and
//! the live preview. Switching images means building a new session.

use crate::constants::{DEFAULT_PRECISION, DEFAULT_TAG, HANDLE_HIT_RADIUS, MIN_BOX_SIZE};
use crate::error::{EditorError, validate_tag};
use crate::format::{AnnotationFormat, FormatError, FormatWarning, YoloFormat};
use crate::interaction::{
    EditState, InteractionContext, Mutation, PointerEvent, Preview, SelectionUpdate,
};
use crate::model::{BoxAnnotation, BoxDocument, BoxId, BoxPatch, ImageSize, Point};
use crate::undo::{Command, HistoryConfig, UndoStack};


/// Tunables the engine needs, usually derived from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Tag given to newly drawn boxes
    pub default_tag: String,
    /// Handle grab radius in image pixels
    pub handle_radius: f32,
    /// Boxes must be strictly larger than this on both sides
    pub min_box_size: f32,
    /// Undo depth limit, `None` for unbounded
    pub max_history: Option<usize>,
    /// Decimal places written on save
    pub precision: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_tag: DEFAULT_TAG.to_string(),
            handle_radius: HANDLE_HIT_RADIUS,
            min_box_size: MIN_BOX_SIZE,
            max_history: None,
            precision: DEFAULT_PRECISION,
        }
    }
}

/// The box document, history and gesture state of the open image.
#[derive(Debug)]
pub struct AnnotationSession {
    image: ImageSize,
    document: BoxDocument,
    history: UndoStack,
    gesture: EditState,
    selection: Option<BoxId>,
    settings: SessionSettings,
    /// Tag for the next created box
    active_tag: String,
    format: YoloFormat,
    /// Unsaved changes since the last load or save
    dirty: bool,
}

impl AnnotationSession {
    /// Start an empty session for an image.
    pub fn new(image: ImageSize, settings: SessionSettings) -> Result<Self, EditorError> {
        validate_tag(&settings.default_tag)?;

        let history = UndoStack::with_config(HistoryConfig {
            max_history: settings.max_history,
        });
        log::debug!(
            "New session for {}x{} image",
            image.width(),
            image.height()
        );

        Ok(Self {
            image,
            document: BoxDocument::new(),
            history,
            gesture: EditState::Idle,
            selection: None,
            active_tag: settings.default_tag.clone(),
            format: YoloFormat::with_precision(settings.precision),
            settings,
            dirty: false,
        })
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Replace the document with the decoded annotation lines.
    ///
    /// History, selection and any gesture are reset. Malformed lines are
    /// skipped and returned.
    pub fn load(&mut self, lines: &[String]) -> Vec<FormatWarning> {
        let decoded = self.format.decode(lines, self.image);
        self.document = decoded.to_document();
        self.history.clear();
        self.gesture = EditState::Idle;
        self.selection = None;
        self.dirty = false;

        log::info!(
            "Loaded {} boxes ({} warnings)",
            self.document.len(),
            decoded.warnings.len()
        );
        decoded.warnings
    }

    /// Serialize the document and mark the session clean.
    pub fn save(&mut self) -> Result<Vec<String>, FormatError> {
        let lines = self.format.encode(&self.document, self.image)?;
        self.dirty = false;
        log::debug!("Saved {} boxes", lines.len());
        Ok(lines)
    }

    // ========================================================================
    // Pointer gestures
    // ========================================================================

    /// Feed a pointer event to the gesture state machine and commit its result.
    pub fn pointer(&mut self, event: PointerEvent) -> Result<(), EditorError> {
        let transition = self.gesture.handle(event, &self.context());

        self.gesture = transition.state;
        match transition.selection {
            SelectionUpdate::Keep => {}
            SelectionUpdate::Select(id) => self.selection = Some(id),
            SelectionUpdate::Clear => self.selection = None,
        }

        if let Some(mutation) = transition.mutation {
            self.apply_mutation(mutation)?;
        }
        Ok(())
    }

    /// Drop the in-progress gesture without committing anything.
    pub fn abort_gesture(&mut self) {
        if !self.gesture.is_idle() {
            log::debug!("Aborted {} gesture", self.gesture.name());
            self.gesture = EditState::Idle;
        }
    }

    fn context(&self) -> InteractionContext<'_> {
        InteractionContext {
            document: &self.document,
            selection: self.selection,
            image: self.image,
            handle_radius: self.settings.handle_radius,
            min_box_size: self.settings.min_box_size,
        }
    }

    fn apply_mutation(&mut self, mutation: Mutation) -> Result<(), EditorError> {
        let command = match mutation {
            Mutation::Create { rect } => {
                let id = self.document.add(self.active_tag.clone(), rect);
                let (index, annotation) = self
                    .document
                    .position(id)
                    .zip(self.document.get(id).cloned())
                    .ok_or_else(|| EditorError::not_found(id))?;
                self.selection = Some(id);
                log::info!("Created box {} '{}'", id, annotation.tag);
                Command::CreateBox { index, annotation }
            }
            Mutation::Move { id, before, after } => {
                self.document.update(id, BoxPatch::rect(after))?;
                log::debug!("Moved box {}", id);
                Command::MoveBox { id, before, after }
            }
            Mutation::Resize { id, before, after } => {
                self.document.update(id, BoxPatch::rect(after))?;
                log::debug!("Resized box {}", id);
                Command::ResizeBox { id, before, after }
            }
        };
        self.commit(command);
        Ok(())
    }

    // ========================================================================
    // Discrete commands
    // ========================================================================

    /// Delete the topmost box whose body or handle is under `point`.
    ///
    /// Returns the deleted id, or `None` if nothing was hit.
    pub fn delete_at(&mut self, point: Point) -> Result<Option<BoxId>, EditorError> {
        let point = point.clamped(self.image);
        match self
            .document
            .topmost_hit(&point, self.settings.handle_radius)
        {
            Some(id) => {
                self.delete_box(id)?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Delete the selected box, if any.
    pub fn delete_selected(&mut self) -> Result<Option<BoxId>, EditorError> {
        match self.selection {
            Some(id) => {
                self.delete_box(id)?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Delete a box by id as one undoable step.
    pub fn delete_box(&mut self, id: BoxId) -> Result<(), EditorError> {
        let (index, annotation) = self.document.remove(id)?;
        self.forget(id);
        log::info!("Deleted box {} '{}'", id, annotation.tag);
        self.commit(Command::DeleteBox { index, annotation });
        Ok(())
    }

    /// Delete every box as a single undoable step.
    ///
    /// Returns the number of boxes removed.
    pub fn clear_all(&mut self) -> Result<usize, EditorError> {
        if self.document.is_empty() {
            return Ok(0);
        }

        let ids: Vec<BoxId> = self.document.iter().map(|b| b.id).collect();
        let mut commands = Vec::with_capacity(ids.len());
        for id in ids {
            let (index, annotation) = self.document.remove(id)?;
            commands.push(Command::DeleteBox { index, annotation });
        }

        let count = commands.len();
        self.selection = None;
        self.abort_gesture();
        log::info!("Cleared {} boxes", count);
        self.commit(Command::Batch {
            description: format!("Delete {} boxes", count),
            commands,
        });
        Ok(count)
    }

    /// Change a box's tag.
    ///
    /// Returns `false` when the box already has that tag and nothing was
    /// recorded.
    pub fn retag(&mut self, id: BoxId, tag: &str) -> Result<bool, EditorError> {
        validate_tag(tag)?;
        let current = self
            .document
            .get(id)
            .ok_or_else(|| EditorError::not_found(id))?;
        if current.tag == tag {
            return Ok(false);
        }

        let previous = self.document.update(id, BoxPatch::tag(tag))?;
        log::debug!("Retagged box {} '{}' -> '{}'", id, previous.tag, tag);
        self.commit(Command::RetagBox {
            id,
            before: previous.tag,
            after: tag.to_string(),
        });
        Ok(true)
    }

    /// Change the tag of the selected box, if any.
    pub fn retag_selected(&mut self, tag: &str) -> Result<bool, EditorError> {
        match self.selection {
            Some(id) => self.retag(id, tag),
            None => Ok(false),
        }
    }

    /// Set the tag used for boxes drawn from now on.
    pub fn set_active_tag(&mut self, tag: &str) -> Result<(), EditorError> {
        validate_tag(tag)?;
        self.active_tag = tag.to_string();
        Ok(())
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Undo the last command. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.abort_gesture();
        let changed = self.history.undo(&mut self.document)?;
        if changed {
            self.after_history_step();
        }
        Ok(changed)
    }

    /// Redo the last undone command. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.abort_gesture();
        let changed = self.history.redo(&mut self.document)?;
        if changed {
            self.after_history_step();
        }
        Ok(changed)
    }

    fn commit(&mut self, command: Command) {
        self.history.commit(command);
        self.dirty = true;
    }

    fn after_history_step(&mut self) {
        self.dirty = true;
        let selection_gone = self
            .selection
            .is_some_and(|id| self.document.get(id).is_none());
        if selection_gone {
            self.selection = None;
        }
    }

    /// Clear selection and gesture state that refer to a removed box.
    fn forget(&mut self, id: BoxId) {
        if self.selection == Some(id) {
            self.selection = None;
        }
        let targets_removed = match &self.gesture {
            EditState::Moving { id: target, .. } | EditState::Resizing { id: target, .. } => {
                *target == id
            }
            EditState::Idle | EditState::Creating { .. } => false,
        };
        if targets_removed {
            self.abort_gesture();
        }
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Snapshot of the boxes in document order.
    pub fn boxes(&self) -> Vec<BoxAnnotation> {
        self.document.list()
    }

    pub fn document(&self) -> &BoxDocument {
        &self.document
    }

    pub fn selection(&self) -> Option<BoxId> {
        self.selection
    }

    /// The selected box, if it still exists.
    pub fn selected_box(&self) -> Option<&BoxAnnotation> {
        self.selection.and_then(|id| self.document.get(id))
    }

    /// Provisional rectangle of the gesture in progress.
    pub fn preview(&self) -> Option<Preview> {
        self.gesture.preview()
    }

    pub fn gesture(&self) -> &EditState {
        &self.gesture
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn image(&self) -> ImageSize {
        self.image
    }

    pub fn active_tag(&self) -> &str {
        &self.active_tag
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Whether there are changes since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
