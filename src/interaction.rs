//! Pointer gesture state machine.
//!
//! Turns pointer down/move/up events into box mutations. Every transition
//! is a pure function of the current [`EditState`], the incoming event and a
//! read-only [`InteractionContext`]; applying the resulting [`Mutation`] and
//! recording it for undo is the session's job.

use crate::model::{BoxDocument, BoxId, HandleKind, ImageSize, Point, Rect, hit_test_handle};

/// Kind of pointer event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// A pointer event in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub point: Point,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Down,
            point: Point::new(x, y),
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Move,
            point: Point::new(x, y),
        }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self {
            kind: PointerEventKind::Up,
            point: Point::new(x, y),
        }
    }
}

/// The active gesture, including its provisional (uncommitted) geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Drawing a new box from `origin` to `current`.
    Creating { origin: Point, current: Point },
    /// Dragging a box by its body.
    Moving {
        id: BoxId,
        /// Pointer position minus the box's top-left at pointer-down
        grab_offset: Point,
        /// Geometry before the drag
        original: Rect,
        /// Provisional geometry
        current: Rect,
    },
    /// Dragging one of a box's handles.
    Resizing {
        id: BoxId,
        handle: HandleKind,
        /// Geometry before the drag
        original: Rect,
        /// Provisional geometry
        current: Rect,
    },
}

/// A committed change produced by pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mutation {
    Create { rect: Rect },
    Move { id: BoxId, before: Rect, after: Rect },
    Resize { id: BoxId, before: Rect, after: Rect },
}

/// How the selection changes as a result of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionUpdate {
    #[default]
    Keep,
    Select(BoxId),
    Clear,
}

/// Result of feeding one event to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: EditState,
    pub selection: SelectionUpdate,
    pub mutation: Option<Mutation>,
}

impl Transition {
    fn to(state: EditState) -> Self {
        Self {
            state,
            selection: SelectionUpdate::Keep,
            mutation: None,
        }
    }

    fn with_selection(mut self, selection: SelectionUpdate) -> Self {
        self.selection = selection;
        self
    }

    fn with_mutation(mut self, mutation: Option<Mutation>) -> Self {
        self.mutation = mutation;
        self
    }
}

/// Provisional rectangle for live-preview rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    /// Box being edited, `None` while creating
    pub target: Option<BoxId>,
    pub rect: Rect,
}

/// Everything a transition may read besides the state itself.
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    pub document: &'a BoxDocument,
    pub selection: Option<BoxId>,
    pub image: ImageSize,
    pub handle_radius: f32,
    pub min_box_size: f32,
}

impl EditState {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            EditState::Idle => "Idle",
            EditState::Creating { .. } => "Creating",
            EditState::Moving { .. } => "Moving",
            EditState::Resizing { .. } => "Resizing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditState::Idle)
    }

    /// The in-progress rectangle, if a gesture is active.
    pub fn preview(&self) -> Option<Preview> {
        match self {
            EditState::Idle => None,
            EditState::Creating { origin, current } => Some(Preview {
                target: None,
                rect: Rect::from_corners(*origin, *current),
            }),
            EditState::Moving { id, current, .. } | EditState::Resizing { id, current, .. } => {
                Some(Preview {
                    target: Some(*id),
                    rect: *current,
                })
            }
        }
    }

    /// Feed one pointer event through the state machine.
    ///
    /// The point is clamped into the image before use.
    pub fn handle(&self, event: PointerEvent, ctx: &InteractionContext<'_>) -> Transition {
        let point = event.point.clamped(ctx.image);
        log::trace!(
            "Pointer {:?} at ({:.1}, {:.1}) in {}",
            event.kind,
            point.x,
            point.y,
            self.name()
        );

        match event.kind {
            PointerEventKind::Down => {
                if !self.is_idle() {
                    log::warn!("Pointer down during {}, dropping gesture", self.name());
                }
                pointer_down(point, ctx)
            }
            PointerEventKind::Move => self.pointer_move(point, ctx),
            PointerEventKind::Up => self.pointer_up(point, ctx),
        }
    }

    fn pointer_move(&self, point: Point, ctx: &InteractionContext<'_>) -> Transition {
        let next = match self {
            // Moves without a button held are not gestures
            EditState::Idle => EditState::Idle,
            EditState::Creating { origin, .. } => EditState::Creating {
                origin: *origin,
                current: point,
            },
            EditState::Moving {
                id,
                grab_offset,
                original,
                ..
            } => EditState::Moving {
                id: *id,
                grab_offset: *grab_offset,
                original: *original,
                current: moved_rect(original, *grab_offset, point, ctx.image),
            },
            EditState::Resizing {
                id,
                handle,
                original,
                ..
            } => EditState::Resizing {
                id: *id,
                handle: *handle,
                original: *original,
                current: handle.drag(original, point),
            },
        };
        Transition::to(next)
    }

    fn pointer_up(&self, point: Point, ctx: &InteractionContext<'_>) -> Transition {
        let mutation = match self {
            EditState::Idle => {
                log::trace!("Stray pointer up ignored");
                None
            }
            EditState::Creating { origin, .. } => {
                let rect = Rect::from_corners(*origin, point);
                if rect.exceeds(ctx.min_box_size) {
                    log::info!(
                        "Box drawn at ({:.1}, {:.1}) size {:.1}x{:.1}",
                        rect.x,
                        rect.y,
                        rect.width,
                        rect.height
                    );
                    Some(Mutation::Create { rect })
                } else {
                    log::debug!("Box below minimum size, discarded");
                    None
                }
            }
            EditState::Moving {
                id,
                grab_offset,
                original,
                ..
            } => {
                let after = moved_rect(original, *grab_offset, point, ctx.image);
                (after != *original).then_some(Mutation::Move {
                    id: *id,
                    before: *original,
                    after,
                })
            }
            EditState::Resizing {
                id,
                handle,
                original,
                ..
            } => {
                let after = handle.drag(original, point);
                if !after.exceeds(ctx.min_box_size) {
                    log::debug!("Resize of {} below minimum size, discarded", id);
                    None
                } else {
                    (after != *original).then_some(Mutation::Resize {
                        id: *id,
                        before: *original,
                        after,
                    })
                }
            }
        };
        Transition::to(EditState::Idle).with_mutation(mutation)
    }
}

/// Decide which gesture a pointer-down starts.
///
/// Priority: a handle of the selected box, then the topmost box body,
/// otherwise a new box.
fn pointer_down(point: Point, ctx: &InteractionContext<'_>) -> Transition {
    let selected_handle = ctx
        .selection
        .and_then(|id| ctx.document.get(id))
        .and_then(|b| {
            hit_test_handle(&point, &b.rect, ctx.handle_radius).map(|handle| (b.id, b.rect, handle))
        });

    if let Some((id, rect, handle)) = selected_handle {
        log::debug!("Resize start on box {}, handle={:?}", id, handle);
        return Transition::to(EditState::Resizing {
            id,
            handle,
            original: rect,
            current: rect,
        });
    }

    if let Some(b) = ctx
        .document
        .topmost_at(&point)
        .and_then(|id| ctx.document.get(id))
    {
        log::debug!("Move start on box {}", b.id);
        let origin = b.rect.origin();
        return Transition::to(EditState::Moving {
            id: b.id,
            grab_offset: Point::new(point.x - origin.x, point.y - origin.y),
            original: b.rect,
            current: b.rect,
        })
        .with_selection(SelectionUpdate::Select(b.id));
    }

    Transition::to(EditState::Creating {
        origin: point,
        current: point,
    })
    .with_selection(SelectionUpdate::Clear)
}

fn moved_rect(original: &Rect, grab_offset: Point, point: Point, image: ImageSize) -> Rect {
    let origin = Point::new(point.x - grab_offset.x, point.y - grab_offset.y);
    image.clamp(&original.with_origin(origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        doc: BoxDocument,
        selection: Option<BoxId>,
        image: ImageSize,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                doc: BoxDocument::new(),
                selection: None,
                image: ImageSize::new(1000.0, 500.0).unwrap(),
            }
        }

        fn ctx(&self) -> InteractionContext<'_> {
            InteractionContext {
                document: &self.doc,
                selection: self.selection,
                image: self.image,
                handle_radius: 6.0,
                min_box_size: 1.0,
            }
        }

        /// Run a full down/move/up drag and return the pointer-up transition.
        fn drag(&self, from: (f32, f32), to: (f32, f32)) -> (Transition, Transition) {
            let ctx = self.ctx();
            let down = EditState::Idle.handle(PointerEvent::down(from.0, from.1), &ctx);
            let moved = down.state.handle(PointerEvent::moved(to.0, to.1), &ctx);
            let up = moved.state.handle(PointerEvent::up(to.0, to.1), &ctx);
            (down, up)
        }
    }

    #[test]
    fn test_create_on_empty_space() {
        let fx = Fixture::new();
        let (down, up) = fx.drag((100.0, 100.0), (300.0, 200.0));
        assert!(matches!(down.state, EditState::Creating { .. }));
        assert_eq!(down.selection, SelectionUpdate::Clear);
        assert_eq!(
            up.mutation,
            Some(Mutation::Create {
                rect: Rect::new(100.0, 100.0, 200.0, 100.0)
            })
        );
        assert!(up.state.is_idle());
    }

    #[test]
    fn test_create_reverse_drag_normalizes() {
        let fx = Fixture::new();
        let (_, up) = fx.drag((300.0, 200.0), (100.0, 100.0));
        assert_eq!(
            up.mutation,
            Some(Mutation::Create {
                rect: Rect::new(100.0, 100.0, 200.0, 100.0)
            })
        );
    }

    #[test]
    fn test_click_without_drag_creates_nothing() {
        let fx = Fixture::new();
        let (_, up) = fx.drag((50.0, 50.0), (50.0, 50.0));
        assert_eq!(up.mutation, None);

        // Thin line is below the minimum size on one axis
        let (_, up) = fx.drag((50.0, 50.0), (150.0, 50.5));
        assert_eq!(up.mutation, None);
    }

    #[test]
    fn test_create_clamps_to_image() {
        let fx = Fixture::new();
        let (_, up) = fx.drag((900.0, 400.0), (1200.0, 800.0));
        assert_eq!(
            up.mutation,
            Some(Mutation::Create {
                rect: Rect::new(900.0, 400.0, 100.0, 100.0)
            })
        );
    }

    #[test]
    fn test_create_preview() {
        let fx = Fixture::new();
        let ctx = fx.ctx();
        let down = EditState::Idle.handle(PointerEvent::down(10.0, 10.0), &ctx);
        let moved = down.state.handle(PointerEvent::moved(30.0, 50.0), &ctx);
        assert_eq!(
            moved.state.preview(),
            Some(Preview {
                target: None,
                rect: Rect::new(10.0, 10.0, 20.0, 40.0)
            })
        );
        assert_eq!(moved.mutation, None);
    }

    #[test]
    fn test_move_body() {
        let mut fx = Fixture::new();
        let id = fx.doc.add("car", Rect::new(100.0, 100.0, 50.0, 50.0));
        let (down, up) = fx.drag((120.0, 110.0), (220.0, 160.0));

        assert_eq!(down.selection, SelectionUpdate::Select(id));
        assert!(matches!(down.state, EditState::Moving { .. }));
        assert_eq!(
            up.mutation,
            Some(Mutation::Move {
                id,
                before: Rect::new(100.0, 100.0, 50.0, 50.0),
                after: Rect::new(200.0, 150.0, 50.0, 50.0),
            })
        );
    }

    #[test]
    fn test_move_clamped_to_image() {
        let mut fx = Fixture::new();
        let id = fx.doc.add("car", Rect::new(100.0, 100.0, 50.0, 50.0));
        let (_, up) = fx.drag((110.0, 110.0), (995.0, 499.0));
        assert_eq!(
            up.mutation,
            Some(Mutation::Move {
                id,
                before: Rect::new(100.0, 100.0, 50.0, 50.0),
                after: Rect::new(950.0, 450.0, 50.0, 50.0),
            })
        );
    }

    #[test]
    fn test_click_on_box_selects_without_mutation() {
        let mut fx = Fixture::new();
        let id = fx.doc.add("car", Rect::new(100.0, 100.0, 50.0, 50.0));
        let (down, up) = fx.drag((120.0, 120.0), (120.0, 120.0));
        assert_eq!(down.selection, SelectionUpdate::Select(id));
        assert_eq!(up.mutation, None);
    }

    #[test]
    fn test_resize_selected_handle() {
        let mut fx = Fixture::new();
        let id = fx.doc.add("car", Rect::new(100.0, 100.0, 50.0, 50.0));
        fx.selection = Some(id);

        let (down, up) = fx.drag((150.0, 150.0), (200.0, 180.0));
        match down.state {
            EditState::Resizing { handle, .. } => {
                assert_eq!(handle, HandleKind::BottomRight);
            }
            other => panic!("Expected Resizing, got {:?}", other),
        }
        assert_eq!(down.selection, SelectionUpdate::Keep);
        assert_eq!(
            up.mutation,
            Some(Mutation::Resize {
                id,
                before: Rect::new(100.0, 100.0, 50.0, 50.0),
                after: Rect::new(100.0, 100.0, 100.0, 80.0),
            })
        );
    }

    #[test]
    fn test_resize_edge_moves_one_axis() {
        let mut fx = Fixture::new();
        let id = fx.doc.add("car", Rect::new(100.0, 100.0, 50.0, 50.0));
        fx.selection = Some(id);

        // Top edge midpoint
        let (_, up) = fx.drag((125.0, 100.0), (140.0, 60.0));
        assert_eq!(
            up.mutation,
            Some(Mutation::Resize {
                id,
                before: Rect::new(100.0, 100.0, 50.0, 50.0),
                after: Rect::new(100.0, 60.0, 50.0, 90.0),
            })
        );
    }

    #[test]
    fn test_resize_past_anchor_flips() {
        let mut fx = Fixture::new();
        let id = fx.doc.add("car", Rect::new(100.0, 100.0, 50.0, 50.0));
        fx.selection = Some(id);

        let (_, up) = fx.drag((150.0, 150.0), (80.0, 70.0));
        assert_eq!(
            up.mutation,
            Some(Mutation::Resize {
                id,
                before: Rect::new(100.0, 100.0, 50.0, 50.0),
                after: Rect::new(80.0, 70.0, 20.0, 30.0),
            })
        );
    }

    #[test]
    fn test_resize_to_zero_area_commits_nothing() {
        let mut fx = Fixture::new();
        let id = fx.doc.add("car", Rect::new(100.0, 100.0, 50.0, 50.0));
        fx.selection = Some(id);

        let (_, up) = fx.drag((150.0, 150.0), (100.0, 100.0));
        assert_eq!(up.mutation, None);
    }

    #[test]
    fn test_unselected_handle_moves_instead() {
        let mut fx = Fixture::new();
        let id = fx.doc.add("car", Rect::new(100.0, 100.0, 50.0, 50.0));
        let (down, _) = fx.drag((150.0, 150.0), (160.0, 160.0));
        assert!(matches!(down.state, EditState::Moving { id: moving, .. } if moving == id));
    }

    #[test]
    fn test_topmost_box_wins_on_overlap() {
        let mut fx = Fixture::new();
        let _b1 = fx.doc.add("b1", Rect::new(100.0, 100.0, 50.0, 50.0));
        let b2 = fx.doc.add("b2", Rect::new(50.0, 50.0, 200.0, 200.0));
        // b1's bottom-right handle, inside b2
        let (down, _) = fx.drag((150.0, 150.0), (150.0, 150.0));
        assert_eq!(down.selection, SelectionUpdate::Select(b2));
    }

    #[test]
    fn test_stray_up_ignored() {
        let fx = Fixture::new();
        let up = EditState::Idle.handle(PointerEvent::up(10.0, 10.0), &fx.ctx());
        assert!(up.state.is_idle());
        assert_eq!(up.mutation, None);
        assert_eq!(up.selection, SelectionUpdate::Keep);
    }

    #[test]
    fn test_move_while_idle_ignored() {
        let fx = Fixture::new();
        let moved = EditState::Idle.handle(PointerEvent::moved(10.0, 10.0), &fx.ctx());
        assert_eq!(moved, Transition::to(EditState::Idle));
    }
}
