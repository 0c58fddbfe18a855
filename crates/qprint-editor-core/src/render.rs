//! Render bookkeeping: which page renders are still wanted
//!
//! Rendering is asynchronous in the browser. Every render of a page gets a
//! [`RenderTicket`] carrying a generation number; starting a newer render,
//! unmounting the page or changing the scale makes older tickets stale, and
//! results delivered with a stale ticket are dropped. Extracted text is only
//! inserted into the store through a current ticket.

use crate::error::EditorError;
use crate::extraction::{extract_page, PageTextContent};
use crate::store::EditorStore;
use std::collections::HashMap;
use tracing::{debug, error};

/// Produces the text runs of a page
pub trait TextRunSource {
    fn page_count(&self) -> u32;

    /// Runs and media box of a 1-based page
    fn page_content(&self, page_number: u32) -> Result<PageTextContent, EditorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTicket {
    pub page_number: u32,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderStatus {
    /// Not mounted or not started
    #[default]
    Idle,
    Rendering,
    Ready,
    /// Needs a new render, e.g. after a scale change
    Stale,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
struct PageRender {
    generation: u64,
    mounted: bool,
    status: RenderStatus,
}

#[derive(Debug, Clone, Default)]
pub struct RenderTracker {
    pages: HashMap<u32, PageRender>,
    next_generation: u64,
}

impl RenderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) rendering a page. Any earlier ticket for it goes stale.
    pub fn begin(&mut self, page_number: u32) -> RenderTicket {
        let generation = self.bump();
        let page = self.pages.entry(page_number).or_default();
        page.generation = generation;
        page.mounted = true;
        page.status = RenderStatus::Rendering;
        RenderTicket {
            page_number,
            generation,
        }
    }

    pub fn is_current(&self, ticket: &RenderTicket) -> bool {
        self.pages
            .get(&ticket.page_number)
            .is_some_and(|p| p.mounted && p.generation == ticket.generation)
    }

    /// Deliver the outcome of a render.
    ///
    /// Returns `Ok(true)` when the text was handed to the store, `Ok(false)`
    /// when the ticket was stale or the render cancelled. Other failures mark
    /// the page failed and are returned; they are not retried.
    pub fn complete(
        &mut self,
        ticket: RenderTicket,
        outcome: Result<PageTextContent, EditorError>,
        store: &mut EditorStore,
    ) -> Result<bool, EditorError> {
        if !self.is_current(&ticket) {
            debug!(
                page = ticket.page_number,
                generation = ticket.generation,
                "Dropping stale render"
            );
            return Ok(false);
        }

        let content = match outcome {
            Ok(content) => content,
            Err(err) if err.is_cancellation() => {
                self.set_status(ticket.page_number, RenderStatus::Idle);
                return Ok(false);
            }
            Err(err) => {
                error!(page = ticket.page_number, error = %err, "Page render failed");
                self.set_status(ticket.page_number, RenderStatus::Failed(err.to_string()));
                return Err(err);
            }
        };

        let viewport = content.viewport(store.scale());
        let page = extract_page(ticket.page_number, &viewport, &content.runs);
        store.insert_extracted_page(page);
        self.set_status(ticket.page_number, RenderStatus::Ready);
        Ok(true)
    }

    /// The page view went away; its in-flight render is abandoned
    pub fn unmount(&mut self, page_number: u32) {
        let generation = self.bump();
        if let Some(page) = self.pages.get_mut(&page_number) {
            page.generation = generation;
            page.mounted = false;
            page.status = RenderStatus::Idle;
        }
    }

    /// Abandon every in-flight render (scale change). Returns the mounted
    /// pages, which need rendering again.
    pub fn invalidate_all(&mut self) -> Vec<u32> {
        let mut remount = Vec::new();
        for (page_number, page) in self.pages.iter_mut() {
            self.next_generation += 1;
            page.generation = self.next_generation;
            if page.mounted {
                page.status = RenderStatus::Stale;
                remount.push(*page_number);
            }
        }
        remount.sort_unstable();
        remount
    }

    pub fn status(&self, page_number: u32) -> RenderStatus {
        self.pages
            .get(&page_number)
            .map(|p| p.status.clone())
            .unwrap_or_default()
    }

    pub fn is_mounted(&self, page_number: u32) -> bool {
        self.pages.get(&page_number).is_some_and(|p| p.mounted)
    }

    fn set_status(&mut self, page_number: u32, status: RenderStatus) {
        if let Some(page) = self.pages.get_mut(&page_number) {
            page.status = status;
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

/// Render a page synchronously from `source` and hand its text to the store
pub fn load_page(
    store: &mut EditorStore,
    tracker: &mut RenderTracker,
    source: &dyn TextRunSource,
    page_number: u32,
) -> Result<bool, EditorError> {
    if page_number == 0 || page_number > source.page_count() {
        return Err(EditorError::PageNotFound(page_number));
    }
    let ticket = tracker.begin(page_number);
    let outcome = source.page_content(page_number);
    tracker.complete(ticket, outcome, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::TextRun;

    struct FixedSource;

    impl TextRunSource for FixedSource {
        fn page_count(&self) -> u32 {
            2
        }

        fn page_content(&self, page_number: u32) -> Result<PageTextContent, EditorError> {
            Ok(content(page_number))
        }
    }

    fn content(page_number: u32) -> PageTextContent {
        PageTextContent {
            page_number,
            media_box: [0.0, 0.0, 612.0, 792.0],
            runs: vec![TextRun::new("Hello", [1.0, 0.0, 0.0, 1.0, 100.0, 700.0], 12.0)],
        }
    }

    #[test]
    fn test_current_ticket_inserts_page() {
        let mut store = EditorStore::default();
        let mut tracker = RenderTracker::new();
        let ticket = tracker.begin(1);
        assert!(tracker.complete(ticket, Ok(content(1)), &mut store).unwrap());
        assert_eq!(store.pages().len(), 1);
        assert_eq!(tracker.status(1), RenderStatus::Ready);
    }

    #[test]
    fn test_superseded_ticket_is_dropped() {
        let mut store = EditorStore::default();
        let mut tracker = RenderTracker::new();
        let old = tracker.begin(1);
        let new = tracker.begin(1);
        assert!(!tracker.is_current(&old));
        assert!(!tracker.complete(old, Ok(content(1)), &mut store).unwrap());
        assert!(store.pages().is_empty());
        assert!(tracker.complete(new, Ok(content(1)), &mut store).unwrap());
    }

    #[test]
    fn test_unmounted_page_drops_result() {
        let mut store = EditorStore::default();
        let mut tracker = RenderTracker::new();
        let ticket = tracker.begin(2);
        tracker.unmount(2);
        assert!(!tracker.complete(ticket, Ok(content(2)), &mut store).unwrap());
        assert!(!tracker.is_mounted(2));
        assert_eq!(tracker.status(2), RenderStatus::Idle);
    }

    #[test]
    fn test_invalidate_all_reports_mounted_pages() {
        let mut tracker = RenderTracker::new();
        let first = tracker.begin(3);
        tracker.begin(1);
        tracker.unmount(1);
        assert_eq!(tracker.invalidate_all(), vec![3]);
        assert!(!tracker.is_current(&first));
        assert_eq!(tracker.status(3), RenderStatus::Stale);
    }

    #[test]
    fn test_cancellation_is_silent() {
        let mut store = EditorStore::default();
        let mut tracker = RenderTracker::new();
        let ticket = tracker.begin(1);
        let outcome = tracker.complete(ticket, Err(EditorError::RenderCancelled(1)), &mut store);
        assert_eq!(outcome, Ok(false));
        assert_eq!(tracker.status(1), RenderStatus::Idle);
    }

    #[test]
    fn test_failure_marks_page_failed() {
        let mut store = EditorStore::default();
        let mut tracker = RenderTracker::new();
        let ticket = tracker.begin(1);
        let err = EditorError::Render {
            page: 1,
            message: "bad stream".to_string(),
        };
        assert_eq!(tracker.complete(ticket, Err(err.clone()), &mut store), Err(err));
        assert!(matches!(tracker.status(1), RenderStatus::Failed(_)));
        assert!(store.pages().is_empty());
    }

    #[test]
    fn test_load_page_from_source() {
        let mut store = EditorStore::default();
        let mut tracker = RenderTracker::new();
        assert!(load_page(&mut store, &mut tracker, &FixedSource, 2).unwrap());
        assert_eq!(store.pages()[0].page_number, 2);
        assert_eq!(store.pages()[0].texts[0].id, "2_0");
        assert_eq!(
            load_page(&mut store, &mut tracker, &FixedSource, 3),
            Err(EditorError::PageNotFound(3))
        );
    }

    #[test]
    fn test_status_of_unknown_page_is_idle() {
        assert_eq!(RenderTracker::new().status(9), RenderStatus::Idle);
    }
}
