//! Structured-text overlay editor for PDF drafts
//!
//! Text extracted from a rendered PDF page becomes a list of editable items
//! laid over the page image. Users edit, restyle, move, add and remove items;
//! every change is recorded in an undo history and the edited items are
//! finally sent back to the draft API, which rewrites the PDF.
//!
//! The crate is UI-agnostic: [`EditorStore`] holds the state, the
//! [`tools`] and [`drag`] modules turn user gestures into store mutations,
//! and [`overlay`] / [`visibility`] compute what to draw. Text runs come
//! from a [`TextRunSource`], either pdf.js in the browser or
//! [`LopdfTextSource`] natively.

pub mod api;
pub mod config;
pub mod coords;
pub mod drag;
pub mod error;
pub mod extraction;
pub mod history;
pub mod lopdf_source;
pub mod overlay;
pub mod page;
pub mod render;
pub mod store;
pub mod style;
pub mod text_item;
pub mod tools;
pub mod visibility;

pub use config::EditorConfig;
pub use coords::Viewport;
pub use drag::DragController;
pub use error::EditorError;
pub use extraction::{extract_page, PageTextContent, TextRun};
pub use history::History;
pub use lopdf_source::LopdfTextSource;
pub use page::Page;
pub use render::{RenderStatus, RenderTicket, RenderTracker, TextRunSource};
pub use store::{EditorStore, RequestTicket, Selection, Tool};
pub use style::{Color, FontFamily, FontStyle, FontWeight, StylePatch, TextDecoration, TextStyle};
pub use text_item::{Placement, Position, TextId, TextItem};

/// Count pages in a PDF without extracting anything
pub fn get_page_count(bytes: &[u8]) -> Result<u32, EditorError> {
    let doc = lopdf::Document::load_mem(bytes)?;
    Ok(doc.get_pages().len() as u32)
}
