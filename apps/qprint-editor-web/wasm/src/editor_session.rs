//! Editor session exposed to JavaScript
//!
//! Wraps the store together with the drag controller, the render tracker and
//! (optionally) a lopdf text source for the loaded PDF. Structured data goes
//! to JavaScript as JSON strings.
//!
//! Network calls are split in two phases so no Rust borrow is held across an
//! `await`: `beginSave()` returns the request body, JavaScript sends it with
//! [`save_edited_pdf`](crate::api::save_edited_pdf), and the outcome comes
//! back through `finishSave()`. Text correction works the same way.

use qprint_editor_core::api::{preview_route, CorrectionResponse, CorrectionTask, SaveResponse};
use qprint_editor_core::overlay::{overlay_nodes, page_frame};
use qprint_editor_core::render::load_page;
use qprint_editor_core::tools::{self, HistoryCommand, KeyChord};
use qprint_editor_core::visibility::PageLayout;
use qprint_editor_core::{
    Color, DragController, EditorConfig, EditorError, EditorStore, FontFamily, LopdfTextSource,
    PageTextContent, RenderStatus, RenderTicket, RenderTracker, RequestTicket, TextRunSource, Tool,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct EditorSession {
    store: EditorStore,
    drag: DragController,
    renders: RenderTracker,
    source: Option<LopdfTextSource>,
    draft_id: Option<String>,
    /// Unscaled page sizes by page number - 1, `None` until known
    page_sizes: Vec<Option<(f64, f64)>>,
}

#[wasm_bindgen]
impl EditorSession {
    /// Create a session, optionally configured from a TOML string
    #[wasm_bindgen(constructor)]
    pub fn new(config_toml: Option<String>) -> Result<EditorSession, JsValue> {
        let config = match config_toml {
            Some(toml) => EditorConfig::from_toml(&toml).map_err(js_err)?,
            None => EditorConfig::default(),
        };
        Ok(EditorSession {
            store: EditorStore::new(config),
            drag: DragController::new(),
            renders: RenderTracker::new(),
            source: None,
            draft_id: None,
            page_sizes: Vec::new(),
        })
    }

    // ============ Document ============

    /// Remember which draft is being edited
    #[wasm_bindgen(js_name = setDraft)]
    pub fn set_draft(&mut self, draft_id: &str, file_name: &str, pdf_url: Option<String>) {
        self.draft_id = Some(draft_id.to_string());
        self.store.set_file_name(file_name);
        self.store.set_pdf_url(pdf_url);
    }

    #[wasm_bindgen(getter, js_name = draftId)]
    pub fn draft_id(&self) -> Option<String> {
        self.draft_id.clone()
    }

    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.store.file_name().to_string()
    }

    #[wasm_bindgen(getter, js_name = pdfUrl)]
    pub fn pdf_url(&self) -> Option<String> {
        self.store.pdf_url().map(str::to_string)
    }

    /// Parse the source PDF for native text extraction. Returns the page count.
    #[wasm_bindgen(js_name = loadPdf)]
    pub fn load_pdf(&mut self, bytes: &[u8]) -> Result<u32, JsValue> {
        let source = LopdfTextSource::from_bytes(bytes).map_err(js_err)?;
        self.page_sizes = source.page_sizes();
        self.source = Some(source);
        self.reset_document();
        log(&format!("Loaded PDF with {} pages", self.page_sizes.len()));
        Ok(self.page_sizes.len() as u32)
    }

    /// Start a document whose pages are rendered by pdf.js only
    #[wasm_bindgen(js_name = setPageCount)]
    pub fn set_page_count(&mut self, count: u32) {
        self.source = None;
        self.page_sizes = vec![None; count as usize];
        self.reset_document();
    }

    /// Record the unscaled size of a page once the renderer knows it
    #[wasm_bindgen(js_name = setPageSize)]
    pub fn set_page_size(&mut self, page_number: u32, width: f64, height: f64) -> bool {
        match page_number
            .checked_sub(1)
            .and_then(|i| self.page_sizes.get_mut(i as usize))
        {
            Some(slot) => {
                *slot = Some((width, height));
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    /// Index of an extracted page in `pagesJson()`
    #[wasm_bindgen(js_name = pageIndexOf)]
    pub fn page_index_of(&self, page_number: u32) -> Option<usize> {
        self.store.page_index_of(page_number)
    }

    #[wasm_bindgen(js_name = pagesJson)]
    pub fn pages_json(&self) -> Result<String, JsValue> {
        to_json(self.store.pages())
    }

    // ============ Rendering ============

    /// Extract a page's text from the loaded PDF and add it to the document
    #[wasm_bindgen(js_name = renderPage)]
    pub fn render_page(&mut self, page_number: u32) -> Result<bool, JsValue> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No PDF loaded"))?;
        load_page(&mut self.store, &mut self.renders, source, page_number).map_err(js_err)
    }

    /// Start a pdf.js render; returns the ticket generation to hand back on completion
    #[wasm_bindgen(js_name = beginRender)]
    pub fn begin_render(&mut self, page_number: u32) -> f64 {
        self.renders.begin(page_number).generation as f64
    }

    /// Deliver pdf.js text content (`{pageNumber, mediaBox, runs}`) for a ticket.
    /// Returns false when the render was superseded.
    #[wasm_bindgen(js_name = completeRender)]
    pub fn complete_render(
        &mut self,
        page_number: u32,
        generation: f64,
        content_json: &str,
    ) -> Result<bool, JsValue> {
        let ticket = ticket(page_number, generation);
        let outcome = serde_json::from_str::<PageTextContent>(content_json).map_err(EditorError::from);
        self.renders
            .complete(ticket, outcome, &mut self.store)
            .map_err(js_err)
    }

    /// Report a failed or cancelled pdf.js render
    #[wasm_bindgen(js_name = failRender)]
    pub fn fail_render(
        &mut self,
        page_number: u32,
        generation: f64,
        message: &str,
        cancelled: bool,
    ) -> Result<(), JsValue> {
        let error = if cancelled {
            EditorError::RenderCancelled(page_number)
        } else {
            EditorError::Render {
                page: page_number,
                message: message.to_string(),
            }
        };
        self.renders
            .complete(ticket(page_number, generation), Err(error), &mut self.store)
            .map(|_| ())
            .map_err(js_err)
    }

    /// The page view was torn down
    #[wasm_bindgen(js_name = unmountPage)]
    pub fn unmount_page(&mut self, page_number: u32) {
        self.renders.unmount(page_number);
    }

    /// One of `idle`, `rendering`, `ready`, `stale`, `failed`
    #[wasm_bindgen(js_name = renderStatus)]
    pub fn render_status(&self, page_number: u32) -> String {
        match self.renders.status(page_number) {
            RenderStatus::Idle => "idle",
            RenderStatus::Rendering => "rendering",
            RenderStatus::Ready => "ready",
            RenderStatus::Stale => "stale",
            RenderStatus::Failed(_) => "failed",
        }
        .to_string()
    }

    /// Page numbers to keep rendered for the given scroll position
    #[wasm_bindgen(js_name = visiblePages)]
    pub fn visible_pages(&self, scroll_top: f64, viewport_height: f64) -> Vec<u32> {
        self.layout().visible_pages(scroll_top, viewport_height)
    }

    /// Stacked page slots (`[{pageNumber, top, width, height}]`)
    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&self) -> Result<String, JsValue> {
        to_json(self.layout().slots())
    }

    #[wasm_bindgen(js_name = overlayJson)]
    pub fn overlay_json(&self, page_index: usize) -> Result<String, JsValue> {
        to_json(&overlay_nodes(&self.store, page_index))
    }

    /// Canvas size of an extracted page, or `null`
    #[wasm_bindgen(js_name = pageFrameJson)]
    pub fn page_frame_json(&self, page_index: usize) -> Result<String, JsValue> {
        to_json(&page_frame(&self.store, page_index))
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.store.scale()
    }

    /// Change the zoom. Returns the mounted pages that must be re-rendered.
    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, scale: f64) -> Result<Vec<u32>, JsValue> {
        self.store.set_scale(scale).map_err(js_err)?;
        // the drag start was recorded in old-scale pixels
        self.drag.pointer_up();
        Ok(self.renders.invalidate_all())
    }

    // ============ Selection & tools ============

    #[wasm_bindgen(js_name = selectionJson)]
    pub fn selection_json(&self) -> Result<String, JsValue> {
        to_json(&self.store.selection())
    }

    #[wasm_bindgen(js_name = selectedItemJson)]
    pub fn selected_item_json(&self) -> Result<String, JsValue> {
        to_json(&self.store.selected_item())
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.store.set_selection(None);
    }

    #[wasm_bindgen(getter, js_name = activeTool)]
    pub fn active_tool(&self) -> String {
        tool_name(self.store.active_tool()).to_string()
    }

    #[wasm_bindgen(js_name = toggleAddTextTool)]
    pub fn toggle_add_text_tool(&mut self) -> String {
        tool_name(self.store.toggle_add_text_tool()).to_string()
    }

    // ============ Editing ============

    /// Click on a page: places a text box when the add-text tool is active.
    /// Returns the new item's id.
    #[wasm_bindgen(js_name = placeText)]
    pub fn place_text(&mut self, page_index: usize, x: f64, y: f64) -> Option<String> {
        tools::place_text(&mut self.store, page_index, x, y)
    }

    #[wasm_bindgen(js_name = focusText)]
    pub fn focus_text(&mut self, page_index: usize, text_id: &str) -> bool {
        tools::focus_text(&mut self.store, page_index, text_id)
    }

    /// Blur of an editable box with its current text
    #[wasm_bindgen(js_name = commitText)]
    pub fn commit_text(&mut self, page_index: usize, text_id: &str, text: &str) -> bool {
        tools::commit_content(&mut self.store, page_index, text_id, text)
    }

    #[wasm_bindgen(js_name = toggleBold)]
    pub fn toggle_bold(&mut self) -> bool {
        tools::toggle_bold(&mut self.store)
    }

    #[wasm_bindgen(js_name = toggleItalic)]
    pub fn toggle_italic(&mut self) -> bool {
        tools::toggle_italic(&mut self.store)
    }

    #[wasm_bindgen(js_name = toggleUnderline)]
    pub fn toggle_underline(&mut self) -> bool {
        tools::toggle_underline(&mut self.store)
    }

    /// `Helvetica`, `Times-Roman`, `Courier` or a CSS generic family
    #[wasm_bindgen(js_name = setFontFamily)]
    pub fn set_font_family(&mut self, family: &str) -> Result<bool, JsValue> {
        let family: FontFamily = family.parse().map_err(js_err)?;
        Ok(tools::set_font_family(&mut self.store, family))
    }

    #[wasm_bindgen(js_name = setColor)]
    pub fn set_color(&mut self, color: &str) -> Result<bool, JsValue> {
        let color: Color = color.parse().map_err(js_err)?;
        Ok(tools::set_color(&mut self.store, color))
    }

    #[wasm_bindgen(js_name = stepFontSize)]
    pub fn step_font_size(&mut self, steps: i32) -> bool {
        tools::step_font_size(&mut self.store, steps)
    }

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> bool {
        tools::delete_selected(&mut self.store)
    }

    /// Returns how many items contained `find`
    #[wasm_bindgen(js_name = replaceAll)]
    pub fn replace_all(&mut self, find: &str, replace: &str) -> u32 {
        tools::replace_all(&mut self.store, find, replace) as u32
    }

    // ============ Dragging ============

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, page_index: usize, text_id: &str, x: f64, y: f64) -> bool {
        self.drag.pointer_down(&mut self.store, page_index, text_id, x, y)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.drag.pointer_move(&mut self.store, x, y)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> bool {
        self.drag.pointer_up().is_some()
    }

    // ============ History ============

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    #[wasm_bindgen(getter, js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    #[wasm_bindgen(getter, js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// `keydown` handler; returns `"undo"` or `"redo"` when the key was a
    /// history shortcut
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&mut self, key: &str, ctrl: bool, meta: bool, shift: bool) -> Option<String> {
        let chord = KeyChord {
            key: key.to_string(),
            ctrl_key: ctrl,
            meta_key: meta,
            shift_key: shift,
        };
        tools::handle_shortcut(&mut self.store, &chord).map(|command| {
            match command {
                HistoryCommand::Undo => "undo",
                HistoryCommand::Redo => "redo",
            }
            .to_string()
        })
    }

    // ============ Save & correction ============

    #[wasm_bindgen(getter, js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    #[wasm_bindgen(getter, js_name = isSaving)]
    pub fn is_saving(&self) -> bool {
        self.store.is_saving()
    }

    /// Current document generation. Read it next to `beginSave()` /
    /// `beginCorrection()` and hand it back to the matching `finish*` call;
    /// loading another document makes it stale.
    #[wasm_bindgen(getter, js_name = documentGeneration)]
    pub fn document_generation(&self) -> f64 {
        self.store.request_ticket().generation as f64
    }

    /// Body for `saveEditedPdf`
    #[wasm_bindgen(js_name = beginSave)]
    pub fn begin_save(&mut self) -> Result<String, JsValue> {
        let (_, request) = self.store.begin_save().map_err(js_err)?;
        to_json(&request)
    }

    /// Pass the response text on success or the error message on failure.
    /// Returns false when the result belonged to a document no longer open.
    #[wasm_bindgen(js_name = finishSave)]
    pub fn finish_save(
        &mut self,
        generation: f64,
        response_json: Option<String>,
        error: Option<String>,
    ) -> Result<bool, JsValue> {
        let outcome = outcome::<SaveResponse>(response_json, error, EditorError::Persistence);
        self.store
            .finish_save(request_ticket(generation), outcome)
            .map_err(js_err)
    }

    /// Where to go after a successful save
    #[wasm_bindgen(js_name = previewRoute)]
    pub fn preview_route(&self) -> Option<String> {
        self.draft_id.as_deref().map(preview_route)
    }

    /// Body for `requestCorrection`; `task` is `spell_fix` or `format_clean`
    #[wasm_bindgen(js_name = beginCorrection)]
    pub fn begin_correction(&mut self, task: &str) -> Result<String, JsValue> {
        let task = CorrectionTask::parse(task)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown correction task: {}", task)))?;
        let (_, request) = self.store.begin_correction(task).map_err(js_err)?;
        to_json(&request)
    }

    /// Returns whether revised pages were applied
    #[wasm_bindgen(js_name = finishCorrection)]
    pub fn finish_correction(
        &mut self,
        generation: f64,
        response_json: Option<String>,
        error: Option<String>,
    ) -> Result<bool, JsValue> {
        let outcome = outcome::<CorrectionResponse>(response_json, error, EditorError::Correction);
        self.store
            .finish_correction(request_ticket(generation), outcome)
            .map_err(js_err)
    }

    #[wasm_bindgen(getter, js_name = activeCorrection)]
    pub fn active_correction(&self) -> Option<String> {
        self.store.active_correction().map(|t| t.as_str().to_string())
    }

    /// Last user-facing message (`{kind, message}`) or `null`
    #[wasm_bindgen(js_name = noticeJson)]
    pub fn notice_json(&self) -> Result<String, JsValue> {
        to_json(&self.store.notice())
    }

    #[wasm_bindgen(js_name = dismissNotice)]
    pub fn dismiss_notice(&mut self) {
        self.store.dismiss_notice();
    }
}

impl EditorSession {
    fn reset_document(&mut self) {
        self.store.set_pages(Vec::new());
        self.store.set_selection(None);
        self.renders = RenderTracker::new();
        self.drag = DragController::new();
    }

    /// Known page sizes, falling back to extracted page dimensions
    fn layout(&self) -> PageLayout {
        let sizes: Vec<Option<(f64, f64)>> = self
            .page_sizes
            .iter()
            .zip(1u32..)
            .map(|(size, page_number)| {
                size.or_else(|| {
                    let index = self.store.page_index_of(page_number)?;
                    let page = self.store.page(index)?;
                    Some((page.original_width, page.original_height))
                })
            })
            .collect();
        PageLayout::new(&sizes, self.store.scale(), &self.store.config().layout)
    }

    /// Page count as reported by the loaded PDF, if any
    pub fn source_page_count(&self) -> Option<u32> {
        self.source.as_ref().map(TextRunSource::page_count)
    }
}

fn ticket(page_number: u32, generation: f64) -> RenderTicket {
    RenderTicket {
        page_number,
        generation: generation as u64,
    }
}

fn request_ticket(generation: f64) -> RequestTicket {
    RequestTicket {
        generation: generation as u64,
    }
}

fn tool_name(tool: Tool) -> &'static str {
    match tool {
        Tool::Select => "select",
        Tool::AddText => "add_text",
    }
}

fn outcome<T: serde::de::DeserializeOwned>(
    response_json: Option<String>,
    error: Option<String>,
    failure: fn(String) -> EditorError,
) -> Result<T, EditorError> {
    match (response_json, error) {
        (_, Some(message)) => Err(failure(message)),
        (Some(json), None) => serde_json::from_str(&json).map_err(EditorError::from),
        (None, None) => Err(failure("empty response".to_string())),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(err: EditorError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}
