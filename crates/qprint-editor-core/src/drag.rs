//! Pointer-driven repositioning of text items
//!
//! One drag at a time. The history snapshot is taken on pointer down, so a
//! whole drag undoes as a single step however many moves it produced.

use crate::store::{EditorStore, Selection, Tool};
use crate::text_item::{Placement, TextId};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrag {
    pub page_index: usize,
    pub text_id: TextId,
    /// Pointer position at pointer down, in viewport pixels
    pub start_pointer: (f64, f64),
    /// Item placement at pointer down
    pub start: Placement,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start dragging an item. Only with the select tool and a visible item;
    /// returns whether a drag started.
    pub fn pointer_down(
        &mut self,
        store: &mut EditorStore,
        page_index: usize,
        text_id: &str,
        pointer_x: f64,
        pointer_y: f64,
    ) -> bool {
        if store.active_tool() != Tool::Select {
            return false;
        }
        let Some(item) = store.text(page_index, text_id).filter(|t| !t.is_hidden) else {
            debug!(page_index, text_id, "pointer down on unknown item");
            return false;
        };
        let start = item.placement;

        store.capture();
        store.set_selection(Some(Selection {
            page_index,
            text_id: text_id.to_string(),
        }));
        self.state = DragState::Dragging(ActiveDrag {
            page_index,
            text_id: text_id.to_string(),
            start_pointer: (pointer_x, pointer_y),
            start,
        });
        true
    }

    /// Move the dragged item by the pointer's offset from where the drag began
    pub fn pointer_move(&mut self, store: &mut EditorStore, pointer_x: f64, pointer_y: f64) -> bool {
        let DragState::Dragging(drag) = &self.state else {
            return false;
        };
        let Some(viewport) = store.viewport(drag.page_index) else {
            return false;
        };
        let dx = pointer_x - drag.start_pointer.0;
        let dy = pointer_y - drag.start_pointer.1;
        let moved = drag.start.moved_by(&viewport, dx, dy);
        store.update_text_position(drag.page_index, &drag.text_id, &moved.position())
    }

    /// End the drag
    pub fn pointer_up(&mut self) -> Option<ActiveDrag> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(drag) => Some(drag),
            DragState::Idle => None,
        }
    }
}
