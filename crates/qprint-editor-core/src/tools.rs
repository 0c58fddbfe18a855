//! User actions on top of the store
//!
//! Each action snapshots history before it mutates, so one user gesture is
//! one undo step. Toolbar actions apply to the current selection and do
//! nothing without one.

use crate::store::{EditorStore, Selection, Tool};
use crate::style::{Color, FontFamily, StylePatch, TextStyle};
use crate::text_item::{Placement, TextId, TextItem};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Place a new text box where the page was clicked (add-text tool only).
///
/// The click marks the baseline: the box top sits one scaled glyph height
/// above it. Returns the new item's id.
pub fn place_text(
    store: &mut EditorStore,
    page_index: usize,
    click_x: f64,
    click_y: f64,
) -> Option<TextId> {
    if store.active_tool() != Tool::AddText {
        return None;
    }
    let viewport = store.viewport(page_index)?;
    let text = &store.config().text;
    let size = text.inserted_font_size;
    let content = text.inserted_content.clone();

    let (pdf_x, pdf_y) = viewport.to_pdf(click_x, click_y);
    let placement = Placement::from_pdf_anchor(&viewport, pdf_x, pdf_y, size);
    let item = TextItem::inserted(&content, placement);
    let id = item.id.clone();

    store.capture();
    store.add_text(page_index, item).then_some(id)
}

/// Commit edited text when the editable box loses focus
pub fn commit_content(store: &mut EditorStore, page_index: usize, text_id: &str, text: &str) -> bool {
    match store.text(page_index, text_id) {
        Some(item) if item.content != text => {
            store.capture();
            store.update_text(page_index, text_id, text)
        }
        _ => false,
    }
}

/// Focus on a text box selects it and leaves the add-text tool
pub fn focus_text(store: &mut EditorStore, page_index: usize, text_id: &str) -> bool {
    if store.text(page_index, text_id).is_none() {
        return false;
    }
    store.set_selection(Some(Selection {
        page_index,
        text_id: text_id.to_string(),
    }));
    store.set_active_tool(Tool::Select);
    true
}

pub fn toggle_bold(store: &mut EditorStore) -> bool {
    restyle_selection(store, StylePatch::toggle_bold)
}

pub fn toggle_italic(store: &mut EditorStore) -> bool {
    restyle_selection(store, StylePatch::toggle_italic)
}

pub fn toggle_underline(store: &mut EditorStore) -> bool {
    restyle_selection(store, StylePatch::toggle_underline)
}

pub fn set_font_family(store: &mut EditorStore, family: FontFamily) -> bool {
    restyle_selection(store, |_| StylePatch::font_family(family))
}

pub fn set_color(store: &mut EditorStore, color: Color) -> bool {
    restyle_selection(store, |_| StylePatch::color(color))
}

/// Grow (`steps > 0`) or shrink the selected text by whole size steps
pub fn step_font_size(store: &mut EditorStore, steps: i32) -> bool {
    let Some(selection) = store.selection().cloned() else {
        return false;
    };
    let Some(current) = store.selected_item().map(|t| t.placement.ui_font_size()) else {
        return false;
    };
    let target = current + f64::from(steps) * store.config().text.font_size_step;
    store.capture();
    store.set_font_size(selection.page_index, &selection.text_id, target)
}

/// Soft-delete the selected text
pub fn delete_selected(store: &mut EditorStore) -> bool {
    let Some(selection) = store.selection().cloned() else {
        return false;
    };
    store.capture();
    store.hide_text(selection.page_index, &selection.text_id)
}

/// Find-and-replace across the document as one undoable step.
/// A blank search string does nothing.
pub fn replace_all(store: &mut EditorStore, find: &str, replace: &str) -> usize {
    if find.trim().is_empty() {
        return 0;
    }
    store.capture();
    store.replace_all_text(find, replace)
}

fn restyle_selection(store: &mut EditorStore, patch_for: impl FnOnce(&TextStyle) -> StylePatch) -> bool {
    let Some(selection) = store.selection().cloned() else {
        debug!("style change without selection");
        return false;
    };
    let Some(patch) = store.selected_item().map(|t| patch_for(&t.style)) else {
        return false;
    };
    store.capture();
    store.update_text_style(selection.page_index, &selection.text_id, &patch)
}

/// A key press with its modifiers, as reported by a `keydown` event
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyChord {
    pub key: String,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub shift_key: bool,
}

impl KeyChord {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta_key = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift_key = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryCommand {
    Undo,
    Redo,
}

impl HistoryCommand {
    /// Ctrl/Cmd+Z undoes; Ctrl/Cmd+Shift+Z and Ctrl/Cmd+Y redo
    pub fn for_chord(chord: &KeyChord) -> Option<Self> {
        if !(chord.ctrl_key || chord.meta_key) {
            return None;
        }
        match chord.key.to_lowercase().as_str() {
            "z" if chord.shift_key => Some(HistoryCommand::Redo),
            "z" => Some(HistoryCommand::Undo),
            "y" => Some(HistoryCommand::Redo),
            _ => None,
        }
    }
}

/// Run the history command bound to `chord`, if any. Returns the command
/// when the chord is a history shortcut, whether or not it changed anything.
pub fn handle_shortcut(store: &mut EditorStore, chord: &KeyChord) -> Option<HistoryCommand> {
    let command = HistoryCommand::for_chord(chord)?;
    match command {
        HistoryCommand::Undo => store.undo(),
        HistoryCommand::Redo => store.redo(),
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::page::Page;
    use crate::style::{FontStyle, FontWeight, TextDecoration};

    fn store() -> EditorStore {
        let mut store = EditorStore::default();
        let viewport = Viewport::new(612.0, 792.0, store.scale());
        let mut page = Page::new(1, 612.0, 792.0);
        page.texts.push(TextItem::extracted(
            "1_0",
            "Hello",
            Placement::from_pdf_anchor(&viewport, 100.0, 700.0, 12.0),
        ));
        store.set_pages(vec![page]);
        store
    }

    fn selected(store: &mut EditorStore) -> &mut EditorStore {
        focus_text(store, 0, "1_0");
        store
    }

    #[test]
    fn test_place_text_at_click() {
        let mut store = store();
        store.set_active_tool(Tool::AddText);
        let id = place_text(&mut store, 0, 150.0, 300.0).unwrap();

        let item = store.text(0, &id).unwrap();
        assert_eq!(item.content, "New Text");
        assert!(item.is_new && item.modified);
        assert_eq!(item.style.color, Color::BLACK);
        assert_eq!(item.placement.original_size(), 14.0);
        assert_eq!(item.placement.ui_font_size(), 21.0);
        assert_eq!(item.placement.ui_x(), 150.0);
        assert_eq!(item.placement.ui_y(), 279.0);
        let anchor = store.viewport(0).unwrap().to_pdf(150.0, 300.0);
        assert_eq!((item.placement.original_x(), item.placement.original_y()), anchor);

        assert_eq!(store.active_tool(), Tool::Select);
        assert_eq!(store.selected_item().map(|t| t.id.clone()), Some(id));
        assert!(store.undo());
        assert_eq!(store.page(0).unwrap().texts.len(), 1);
    }

    #[test]
    fn test_place_text_requires_add_text_tool() {
        let mut store = store();
        assert!(place_text(&mut store, 0, 10.0, 10.0).is_none());
        store.set_active_tool(Tool::AddText);
        assert!(place_text(&mut store, 4, 10.0, 10.0).is_none());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_commit_only_when_changed() {
        let mut store = store();
        assert!(!commit_content(&mut store, 0, "1_0", "Hello"));
        assert!(!store.can_undo());

        assert!(commit_content(&mut store, 0, "1_0", "Hello world"));
        assert_eq!(store.text(0, "1_0").unwrap().content, "Hello world");
        store.undo();
        assert_eq!(store.text(0, "1_0").unwrap().content, "Hello");
    }

    #[test]
    fn test_focus_switches_tool() {
        let mut store = store();
        store.set_active_tool(Tool::AddText);
        assert!(focus_text(&mut store, 0, "1_0"));
        assert_eq!(store.active_tool(), Tool::Select);
        assert!(!focus_text(&mut store, 0, "missing"));
    }

    #[test]
    fn test_style_toggles_flip() {
        let mut store = store();
        let store = selected(&mut store);
        assert!(toggle_bold(store));
        assert!(toggle_italic(store));
        assert!(toggle_underline(store));
        let style = store.selected_item().unwrap().style;
        assert_eq!(style.font_weight, FontWeight::Bold);
        assert_eq!(style.font_style, FontStyle::Italic);
        assert_eq!(style.text_decoration, TextDecoration::Underline);

        toggle_bold(store);
        assert_eq!(store.selected_item().unwrap().style.font_weight, FontWeight::Normal);
        assert_eq!(store.history().past_len(), 4);
    }

    #[test]
    fn test_toolbar_without_selection_is_noop() {
        let mut store = store();
        assert!(!toggle_bold(&mut store));
        assert!(!set_color(&mut store, Color::BLACK));
        assert!(!step_font_size(&mut store, 1));
        assert!(!delete_selected(&mut store));
        assert!(!store.can_undo());
    }

    #[test]
    fn test_font_family_and_color() {
        let mut store = store();
        let store = selected(&mut store);
        set_font_family(store, FontFamily::Courier);
        set_color(store, "#ff0000".parse().unwrap());
        let style = store.selected_item().unwrap().style;
        assert_eq!(style.font_family, FontFamily::Courier);
        assert_eq!(style.color.to_string(), "#ff0000");
    }

    #[test]
    fn test_font_step_and_clamp() {
        let mut store = store();
        let store = selected(&mut store);
        // 12pt at 1.5x is 18px
        let ui_size = |store: &EditorStore| store.selected_item().unwrap().placement.ui_font_size();
        assert!(step_font_size(store, 1));
        assert!((ui_size(store) - 20.0).abs() < 1e-9);
        step_font_size(store, -10);
        assert!((ui_size(store) - 8.0).abs() < 1e-9);
        step_font_size(store, 100);
        assert!((ui_size(store) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_delete_hides_and_undoes() {
        let mut store = store();
        let store = selected(&mut store);
        assert!(delete_selected(store));
        assert!(store.text(0, "1_0").unwrap().is_hidden);
        assert!(store.selection().is_none());
        store.undo();
        assert!(!store.text(0, "1_0").unwrap().is_hidden);
    }

    #[test]
    fn test_replace_all_is_one_undo_step() {
        let mut store = store();
        assert_eq!(replace_all(&mut store, "Hello", "Bye"), 1);
        assert_eq!(replace_all(&mut store, "   ", "x"), 0);
        store.undo();
        assert_eq!(store.text(0, "1_0").unwrap().content, "Hello");
    }

    #[test]
    fn test_shortcut_mapping() {
        assert_eq!(HistoryCommand::for_chord(&KeyChord::new("z").ctrl()), Some(HistoryCommand::Undo));
        assert_eq!(HistoryCommand::for_chord(&KeyChord::new("z").meta()), Some(HistoryCommand::Undo));
        assert_eq!(
            HistoryCommand::for_chord(&KeyChord::new("Z").ctrl().shift()),
            Some(HistoryCommand::Redo)
        );
        assert_eq!(HistoryCommand::for_chord(&KeyChord::new("y").meta()), Some(HistoryCommand::Redo));
        assert_eq!(HistoryCommand::for_chord(&KeyChord::new("z")), None);
        assert_eq!(HistoryCommand::for_chord(&KeyChord::new("x").ctrl()), None);
    }

    #[test]
    fn test_handle_shortcut_runs_history() {
        let mut store = store();
        commit_content(&mut store, 0, "1_0", "changed");
        assert_eq!(handle_shortcut(&mut store, &KeyChord::new("z").ctrl()), Some(HistoryCommand::Undo));
        assert_eq!(store.text(0, "1_0").unwrap().content, "Hello");
        handle_shortcut(&mut store, &KeyChord::new("y").ctrl());
        assert_eq!(store.text(0, "1_0").unwrap().content, "changed");
    }

    #[test]
    fn test_key_chord_from_event_json() {
        let chord: KeyChord = serde_json::from_str(r#"{"key":"z","metaKey":true}"#).unwrap();
        assert_eq!(chord, KeyChord::new("z").meta());
    }
}
