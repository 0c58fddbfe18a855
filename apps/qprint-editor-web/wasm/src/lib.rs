//! WASM bindings for the QPrint text overlay editor
//!
//! All editor state lives in Rust inside an [`EditorSession`]; JavaScript
//! renders canvases with pdf.js, forwards DOM events and performs network I/O.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { EditorSession, fetchDraft, saveEditedPdf } from './pkg/qprint_editor_wasm.js';
//!
//! await init();
//!
//! const draft = await fetchDraft('/api', draftId, token);
//! const session = new EditorSession();
//! session.setDraft(draftId, draft.fileName, draft.signedUrl);
//! session.loadPdf(new Uint8Array(await (await fetch(draft.signedUrl)).arrayBuffer()));
//!
//! for (const page of session.visiblePages(scroller.scrollTop, scroller.clientHeight)) {
//!     session.renderPage(page);
//!     drawOverlay(JSON.parse(session.overlayJson(session.pageIndexOf(page))));
//! }
//!
//! const generation = session.documentGeneration;
//! const body = session.beginSave();
//! let response, error;
//! try {
//!     response = await saveEditedPdf('/api', draftId, token, body);
//! } catch (e) {
//!     error = String(e);
//! }
//! // throws with the save error; false when another PDF was opened meanwhile
//! if (session.finishSave(generation, response, error)) {
//!     location.assign(session.previewRoute());
//! }
//! ```

pub mod api;
pub mod editor_session;

use wasm_bindgen::prelude::*;

pub use editor_session::EditorSession;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
