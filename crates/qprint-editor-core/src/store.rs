//! Editor state and the mutation API
//!
//! [`EditorStore`] owns everything one editor instance knows about its
//! document: pages and their text items, undo/redo history, selection, the
//! active tool and the in-flight save / correction requests. It is an
//! ordinary value, so several editors (or tests) can run side by side.
//!
//! Mutations never fail on stale references: an unknown page index or text id
//! leaves the state untouched and the call returns `false`.
//!
//! History capture is explicit. Callers run [`EditorStore::capture`] before a
//! mutation they want to be undoable; the interaction helpers in
//! [`crate::tools`] and [`crate::drag`] do this for every user action.

use crate::api::{
    collect_save_items, CorrectionRequest, CorrectionResponse, CorrectionTask, SaveRequest,
    SaveResponse,
};
use crate::config::EditorConfig;
use crate::coords::Viewport;
use crate::error::EditorError;
use crate::history::History;
use crate::page::Page;
use crate::style::StylePatch;
use crate::text_item::{Position, TextId, TextItem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// The item the toolbar acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub page_index: usize,
    pub text_id: TextId,
}

/// What a click on the page does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Click selects, drag moves
    #[default]
    Select,
    /// Click places a new text box
    AddText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Error,
}

/// Identifies the document a save or correction request was started against.
/// Replacing the document makes earlier tickets stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub generation: u64,
}

/// Message for the user about the outcome of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorStore {
    config: EditorConfig,
    file_name: String,
    pdf_url: Option<String>,
    pages: Vec<Page>,
    history: History<Vec<Page>>,
    selection: Option<Selection>,
    active_tool: Tool,
    scale: f64,
    dirty: bool,
    /// Bumped whenever the document is replaced
    generation: u64,
    saving: bool,
    correction: Option<CorrectionTask>,
    notice: Option<Notice>,
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorStore {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            history: History::new(config.history_depth),
            scale: config.scale,
            config,
            file_name: String::new(),
            pdf_url: None,
            pages: Vec::new(),
            selection: None,
            active_tool: Tool::Select,
            dirty: false,
            generation: 0,
            saving: false,
            correction: None,
            notice: None,
        }
    }

    // ============ Accessors ============

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn set_file_name(&mut self, name: &str) {
        self.file_name = name.to_string();
    }

    pub fn pdf_url(&self) -> Option<&str> {
        self.pdf_url.as_deref()
    }

    pub fn set_pdf_url(&mut self, url: Option<String>) {
        self.pdf_url = url;
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, page_index: usize) -> Option<&Page> {
        self.pages.get(page_index)
    }

    /// Index of the page with the given 1-based number, if it has been extracted
    pub fn page_index_of(&self, page_number: u32) -> Option<usize> {
        self.pages.iter().position(|p| p.page_number == page_number)
    }

    pub fn text(&self, page_index: usize, text_id: &str) -> Option<&TextItem> {
        self.page(page_index).and_then(|page| page.text(text_id))
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Transform for a page at the current scale
    pub fn viewport(&self, page_index: usize) -> Option<Viewport> {
        self.page(page_index).map(|page| page.viewport(self.scale))
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// The selected item, if the selection still resolves
    pub fn selected_item(&self) -> Option<&TextItem> {
        let selection = self.selection.as_ref()?;
        self.text(selection.page_index, &selection.text_id)
    }

    pub fn active_tool(&self) -> Tool {
        self.active_tool
    }

    pub fn set_active_tool(&mut self, tool: Tool) {
        self.active_tool = tool;
    }

    /// Switch between selecting and placing text; clears the selection
    pub fn toggle_add_text_tool(&mut self) -> Tool {
        self.active_tool = match self.active_tool {
            Tool::Select => Tool::AddText,
            Tool::AddText => Tool::Select,
        };
        self.selection = None;
        self.active_tool
    }

    /// Whether there are edits since load or the last successful save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn history(&self) -> &History<Vec<Page>> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn active_correction(&self) -> Option<CorrectionTask> {
        self.correction
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // ============ History ============

    /// Snapshot the pages before a mutation. Does nothing before the first
    /// page is loaded.
    pub fn capture(&mut self) {
        if self.pages.is_empty() {
            return;
        }
        self.history.capture(&self.pages);
    }

    /// Restore the state before the last captured mutation
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.pages);
        if undone {
            self.selection = None;
            self.dirty = true;
        }
        undone
    }

    /// Re-apply the last undone state
    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.pages);
        if redone {
            self.selection = None;
            self.dirty = true;
        }
        redone
    }

    // ============ Whole-document updates ============

    /// Replace the document (a new draft was opened); history no longer applies.
    /// Requests still in flight for the previous document are abandoned.
    pub fn set_pages(&mut self, pages: Vec<Page>) {
        info!(page_count = pages.len(), "Loading document pages");
        self.pages = pages;
        self.history.clear();
        self.generation += 1;
        self.saving = false;
        self.correction = None;
        self.dirty = false;
    }

    /// Ticket for a request started now against the current document
    pub fn request_ticket(&self) -> RequestTicket {
        RequestTicket {
            generation: self.generation,
        }
    }

    /// Add a freshly extracted page unless one with the same number exists.
    ///
    /// Pages stay ordered by page number. The page is unedited source content,
    /// so it is added to every history snapshot that lacks it too; undoing an
    /// edit made before a page was extracted does not make that page vanish.
    pub fn insert_extracted_page(&mut self, mut page: Page) -> bool {
        if self.page_index_of(page.page_number).is_some() {
            debug!(page = page.page_number, "Page already extracted");
            return false;
        }

        let viewport = page.viewport(self.scale);
        for text in &mut page.texts {
            text.placement = text.placement.rescaled(&viewport);
        }

        for snapshot in self.history.snapshots_mut() {
            insert_sorted(snapshot, &page);
        }
        debug!(
            page = page.page_number,
            texts = page.texts.len(),
            "Inserted extracted page"
        );
        insert_sorted(&mut self.pages, &page);
        true
    }

    /// Replace every page with a revised set from a text-correction service.
    /// Redo is invalidated since the document changed outside the history.
    ///
    /// PDF-space fields are authoritative: viewport positions are recomputed
    /// at the current scale, which may have changed while the service ran.
    pub fn apply_updated_pages(&mut self, mut pages: Vec<Page>) {
        rescale_pages(&mut pages, self.scale);
        self.pages = pages;
        self.dirty = true;
        self.history.clear_future();
    }

    /// Change the render scale, recomputing every viewport position
    pub fn set_scale(&mut self, scale: f64) -> Result<(), EditorError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EditorError::Config(format!(
                "scale must be positive, got {}",
                scale
            )));
        }
        self.scale = scale;
        rescale_pages(&mut self.pages, scale);
        for snapshot in self.history.snapshots_mut() {
            rescale_pages(snapshot, scale);
        }
        Ok(())
    }

    // ============ Item mutations ============

    /// Set the text of an item
    pub fn update_text(&mut self, page_index: usize, text_id: &str, content: &str) -> bool {
        self.with_text(page_index, text_id, |text, _| text.set_content(content))
    }

    /// Merge style fields into an item
    pub fn update_text_style(
        &mut self,
        page_index: usize,
        text_id: &str,
        patch: &StylePatch,
    ) -> bool {
        self.with_text(page_index, text_id, |text, _| text.apply_style(patch))
    }

    /// Move an item; both coordinate pairs come together in `position`
    pub fn update_text_position(
        &mut self,
        page_index: usize,
        text_id: &str,
        position: &Position,
    ) -> bool {
        self.with_text(page_index, text_id, |text, _| text.set_position(position))
    }

    /// Resize an item to `ui_font_size` pixels (clamped to the configured
    /// bounds). The PDF size follows and the baseline stays put.
    pub fn set_font_size(&mut self, page_index: usize, text_id: &str, ui_font_size: f64) -> bool {
        let bounds = &self.config.text;
        let ui_font_size = ui_font_size.clamp(bounds.min_ui_font_size, bounds.max_ui_font_size);
        self.with_text(page_index, text_id, |text, viewport| {
            let pdf_size = ui_font_size / viewport.scale;
            text.set_placement(text.placement.with_font_size(viewport, pdf_size));
        })
    }

    /// Soft-delete an item: it stops rendering and is never saved
    pub fn hide_text(&mut self, page_index: usize, text_id: &str) -> bool {
        let hidden = self.with_text(page_index, text_id, |text, _| {
            text.is_hidden = true;
            text.modified = true;
        });
        if hidden
            && self
                .selection
                .as_ref()
                .is_some_and(|s| s.page_index == page_index && s.text_id == text_id)
        {
            self.selection = None;
        }
        hidden
    }

    /// Append a new item to a page, select it and return to the select tool
    pub fn add_text(&mut self, page_index: usize, item: TextItem) -> bool {
        let Some(page) = self.pages.get_mut(page_index) else {
            debug!(page_index, "add_text: no such page");
            return false;
        };
        let text_id = item.id.clone();
        page.texts.push(item);
        self.dirty = true;
        self.selection = Some(Selection {
            page_index,
            text_id,
        });
        self.active_tool = Tool::Select;
        true
    }

    /// Replace every literal occurrence of `find` in every item.
    ///
    /// An item is flagged modified if its content before replacement contained
    /// `find` or it was already modified. Returns how many items contained
    /// `find`. An empty `find` does nothing.
    pub fn replace_all_text(&mut self, find: &str, replace: &str) -> usize {
        if find.is_empty() {
            return 0;
        }
        let mut matched = 0;
        for text in self.pages.iter_mut().flat_map(|p| p.texts.iter_mut()) {
            if text.content.contains(find) {
                text.content = text.content.replace(find, replace);
                text.modified = true;
                matched += 1;
            }
        }
        self.dirty = true;
        matched
    }

    // ============ Requests ============

    /// Start a save: collect the edited items. Fails while a save is in flight.
    pub fn begin_save(&mut self) -> Result<(RequestTicket, SaveRequest), EditorError> {
        if self.saving {
            return Err(EditorError::Busy("save"));
        }
        self.saving = true;
        let updated_text_items = collect_save_items(&self.pages);
        info!(items = updated_text_items.len(), "Saving edited text");
        Ok((self.request_ticket(), SaveRequest { updated_text_items }))
    }

    /// Finish a save. On failure the edits stay in memory for a manual retry
    /// and the user gets an error notice.
    ///
    /// Returns `Ok(false)` without touching any state when the ticket belongs
    /// to a document that has since been replaced.
    pub fn finish_save(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<SaveResponse, EditorError>,
    ) -> Result<bool, EditorError> {
        if ticket != self.request_ticket() {
            debug!(generation = ticket.generation, "Dropping save result for a replaced document");
            return Ok(false);
        }
        self.saving = false;
        let error = match outcome {
            Ok(SaveResponse { success: true }) => {
                self.dirty = false;
                self.notice = Some(Notice::info("PDF saved"));
                return Ok(true);
            }
            Ok(SaveResponse { success: false }) => {
                EditorError::Persistence("server rejected the edits".to_string())
            }
            Err(EditorError::Persistence(message)) => EditorError::Persistence(message),
            Err(other) => EditorError::Persistence(other.to_string()),
        };
        warn!(error = %error, "Save failed");
        self.notice = Some(Notice::error(error.to_string()));
        Err(error)
    }

    /// Start a text-correction request over the current pages
    pub fn begin_correction(
        &mut self,
        task: CorrectionTask,
    ) -> Result<(RequestTicket, CorrectionRequest), EditorError> {
        if let Some(active) = self.correction {
            debug!(active = active.as_str(), requested = task.as_str(), "Correction busy");
            return Err(EditorError::Busy("text correction"));
        }
        self.correction = Some(task);
        let request = CorrectionRequest {
            pages: self.pages.clone(),
        };
        Ok((self.request_ticket(), request))
    }

    /// Finish a text-correction request. Returned pages replace the document
    /// (undoable). Returns whether anything was applied; results for a
    /// replaced document are dropped.
    pub fn finish_correction(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<CorrectionResponse, EditorError>,
    ) -> Result<bool, EditorError> {
        if ticket != self.request_ticket() {
            debug!(
                generation = ticket.generation,
                "Dropping correction result for a replaced document"
            );
            return Ok(false);
        }
        let task = self.correction.take();
        match outcome {
            Ok(CorrectionResponse { pages: Some(pages) }) => {
                self.capture();
                self.apply_updated_pages(pages);
                self.selection = None;
                Ok(true)
            }
            Ok(CorrectionResponse { pages: None }) => Ok(false),
            Err(err) => {
                let error = match err {
                    EditorError::Correction(message) => EditorError::Correction(message),
                    other => EditorError::Correction(other.to_string()),
                };
                warn!(
                    task = task.map(|t| t.as_str()).unwrap_or("unknown"),
                    error = %error,
                    "Text correction failed"
                );
                self.notice = Some(Notice::error(error.to_string()));
                Err(error)
            }
        }
    }

    fn with_text(
        &mut self,
        page_index: usize,
        text_id: &str,
        apply: impl FnOnce(&mut TextItem, &Viewport),
    ) -> bool {
        let scale = self.scale;
        let Some(page) = self.pages.get_mut(page_index) else {
            debug!(page_index, text_id, "No such page; ignoring edit");
            return false;
        };
        let viewport = page.viewport(scale);
        let Some(text) = page.text_mut(text_id) else {
            debug!(page_index, text_id, "No such text item; ignoring edit");
            return false;
        };
        apply(text, &viewport);
        self.dirty = true;
        true
    }
}

fn insert_sorted(pages: &mut Vec<Page>, page: &Page) {
    if pages.iter().any(|p| p.page_number == page.page_number) {
        return;
    }
    let at = pages.partition_point(|p| p.page_number < page.page_number);
    pages.insert(at, page.clone());
}

fn rescale_pages(pages: &mut [Page], scale: f64) {
    for page in pages {
        let viewport = page.viewport(scale);
        for text in &mut page.texts {
            text.placement = text.placement.rescaled(&viewport);
        }
    }
}
