//! Undo/Redo system for box editing.
//!
//! Every committed mutation is recorded as a [`Command`] that carries enough
//! data to both re-apply and reverse itself against a [`BoxDocument`] by id.
//! History is linear: committing after an undo discards the redo path.

use crate::error::EditorError;
use crate::model::{BoxAnnotation, BoxDocument, BoxId, BoxPatch, Rect};

// ============================================================================
// Command Types
// ============================================================================

/// A command that can be undone and redone.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A box was drawn
    CreateBox {
        /// Position in document order at creation
        index: usize,
        /// The box that was added
        annotation: BoxAnnotation,
    },
    /// A box was deleted
    DeleteBox {
        /// Position in document order before deletion
        index: usize,
        /// The box that was removed (stored for undo)
        annotation: BoxAnnotation,
    },
    /// A box was dragged by its body
    MoveBox {
        id: BoxId,
        before: Rect,
        after: Rect,
    },
    /// A box was dragged by one of its handles
    ResizeBox {
        id: BoxId,
        before: Rect,
        after: Rect,
    },
    /// A box's tag was changed
    RetagBox {
        id: BoxId,
        before: String,
        after: String,
    },
    /// Batch command - groups multiple commands into one undo step
    Batch {
        /// Description of the batch operation
        description: String,
        /// The commands in this batch, in the order they were performed
        commands: Vec<Command>,
    },
}

impl Command {
    /// Get a human-readable description of this command
    pub fn description(&self) -> String {
        match self {
            Command::CreateBox { .. } => "Create box".to_string(),
            Command::DeleteBox { .. } => "Delete box".to_string(),
            Command::MoveBox { .. } => "Move box".to_string(),
            Command::ResizeBox { .. } => "Resize box".to_string(),
            Command::RetagBox { after, .. } => format!("Change tag to '{}'", after),
            Command::Batch { description, .. } => description.clone(),
        }
    }

    /// Re-apply the command to the document.
    pub fn redo(&self, doc: &mut BoxDocument) -> Result<(), EditorError> {
        match self {
            Command::CreateBox { index, annotation } => {
                doc.restore(*index, annotation.clone())?;
                log::debug!("⏩ Redid create box {}", annotation.id);
            }
            Command::DeleteBox { annotation, .. } => {
                doc.remove(annotation.id)?;
                log::debug!("⏩ Redid delete box {}", annotation.id);
            }
            Command::MoveBox { id, after, .. } | Command::ResizeBox { id, after, .. } => {
                doc.update(*id, BoxPatch::rect(*after))?;
                log::debug!("⏩ Redid geometry change on {}", id);
            }
            Command::RetagBox { id, after, .. } => {
                doc.update(*id, BoxPatch::tag(after.clone()))?;
                log::debug!("⏩ Redid tag change on {}", id);
            }
            Command::Batch { commands, .. } => {
                for (done, cmd) in commands.iter().enumerate() {
                    if let Err(e) = cmd.redo(doc) {
                        // Leave the document as it was before the batch
                        for applied in commands[..done].iter().rev() {
                            if let Err(rollback) = applied.undo(doc) {
                                log::error!("Batch rollback failed: {}", rollback);
                            }
                        }
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }

    /// Reverse the command's effect on the document.
    pub fn undo(&self, doc: &mut BoxDocument) -> Result<(), EditorError> {
        match self {
            Command::CreateBox { annotation, .. } => {
                doc.remove(annotation.id)?;
                log::debug!("⏪ Undid create box {}", annotation.id);
            }
            Command::DeleteBox { index, annotation } => {
                doc.restore(*index, annotation.clone())?;
                log::debug!("⏪ Undid delete box {}", annotation.id);
            }
            Command::MoveBox { id, before, .. } | Command::ResizeBox { id, before, .. } => {
                doc.update(*id, BoxPatch::rect(*before))?;
                log::debug!("⏪ Undid geometry change on {}", id);
            }
            Command::RetagBox { id, before, .. } => {
                doc.update(*id, BoxPatch::tag(before.clone()))?;
                log::debug!("⏪ Undid tag change on {}", id);
            }
            Command::Batch { commands, .. } => {
                // Undo batch in reverse order
                for (done, cmd) in commands.iter().rev().enumerate() {
                    if let Err(e) = cmd.undo(doc) {
                        for undone in &commands[commands.len() - done..] {
                            if let Err(rollback) = undone.redo(doc) {
                                log::error!("Batch rollback failed: {}", rollback);
                            }
                        }
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Undo Stack
// ============================================================================

/// Configuration for the undo stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of commands kept for undo.
    ///
    /// `None` keeps everything. With a cap, the oldest command is evicted
    /// once a commit would exceed it, so undo depth never goes past the cap.
    pub max_history: Option<usize>,
}

/// The undo/redo history stack.
///
/// Maintains two stacks:
/// - `undo_stack`: Commands that can be undone (most recent at the end)
/// - `redo_stack`: Commands that can be redone (most recent at the end)
///
/// When a new command is committed, it's pushed to undo_stack and redo_stack is cleared.
/// When undo is called, the command is moved from undo_stack to redo_stack.
/// When redo is called, the command is moved from redo_stack to undo_stack.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    /// Stack of commands that can be undone
    undo_stack: Vec<Command>,
    /// Stack of commands that can be redone
    redo_stack: Vec<Command>,
    /// Configuration
    config: HistoryConfig,
}

impl UndoStack {
    /// Create a new empty, unbounded undo stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record a command that has already been applied.
    /// This clears the redo stack (can't redo after a new action).
    pub fn commit(&mut self, command: Command) {
        log::debug!("📝 Undo: pushed '{}'", command.description());
        self.undo_stack.push(command);
        self.redo_stack.clear();

        if let Some(max) = self.config.max_history {
            let excess = self.undo_stack.len().saturating_sub(max);
            if excess > 0 {
                self.undo_stack.drain(..excess);
                log::trace!("Undo history capped at {}, evicted {}", max, excess);
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo the most recent command against `doc`.
    ///
    /// Returns `Ok(false)` when there is nothing to undo. If the document
    /// rejects the command, it stays on the undo stack and the error is
    /// returned.
    pub fn undo(&mut self, doc: &mut BoxDocument) -> Result<bool, EditorError> {
        let Some(cmd) = self.undo_stack.pop() else {
            return Ok(false);
        };

        if let Err(e) = cmd.undo(doc) {
            log::error!("Undo of '{}' failed: {}", cmd.description(), e);
            self.undo_stack.push(cmd);
            return Err(e);
        }

        log::debug!("⏪ Undo: '{}'", cmd.description());
        self.redo_stack.push(cmd);
        Ok(true)
    }

    /// Redo the most recently undone command against `doc`.
    ///
    /// Returns `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, doc: &mut BoxDocument) -> Result<bool, EditorError> {
        let Some(cmd) = self.redo_stack.pop() else {
            return Ok(false);
        };

        if let Err(e) = cmd.redo(doc) {
            log::error!("Redo of '{}' failed: {}", cmd.description(), e);
            self.redo_stack.push(cmd);
            return Err(e);
        }

        log::debug!("⏩ Redo: '{}'", cmd.description());
        self.undo_stack.push(cmd);
        Ok(true)
    }

    /// Get the description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Get the description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }

    /// Get the number of commands in undo history
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of commands in redo history
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
