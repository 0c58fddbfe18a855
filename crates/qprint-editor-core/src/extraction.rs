//! Turning rendered text runs into editable text items
//!
//! Runs come from whatever renders the page: pdf.js in the browser or
//! [`LopdfTextSource`](crate::lopdf_source::LopdfTextSource) natively.

use crate::coords::Viewport;
use crate::page::Page;
use crate::text_item::{Placement, TextItem};
use serde::{Deserialize, Serialize};

/// One run of text as reported by the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(rename = "str")]
    pub text: String,
    /// Text rendering matrix `[a, b, c, d, e, f]`; `e`/`f` is the PDF-space anchor
    pub transform: [f64; 6],
    /// Glyph height in PDF points
    pub height: f64,
}

impl TextRun {
    pub fn new(text: impl Into<String>, transform: [f64; 6], height: f64) -> Self {
        Self {
            text: text.into(),
            transform,
            height,
        }
    }

    pub fn anchor(&self) -> (f64, f64) {
        (self.transform[4], self.transform[5])
    }
}

/// Everything the renderer reports for one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTextContent {
    pub page_number: u32,
    /// Page box in PDF space: `[x, y, width, height]`
    pub media_box: [f64; 4],
    pub runs: Vec<TextRun>,
}

impl PageTextContent {
    pub fn viewport(&self, scale: f64) -> Viewport {
        Viewport::with_media_box(self.media_box, scale)
    }
}

/// Build the page entry for freshly rendered text.
///
/// Blank runs are skipped; ids are `"{page}_{n}"` with `n` counting the kept
/// runs. Every item starts unmodified with the default extracted style.
pub fn extract_page(page_number: u32, viewport: &Viewport, runs: &[TextRun]) -> Page {
    let texts = runs
        .iter()
        .filter(|run| !run.text.trim().is_empty())
        .enumerate()
        .map(|(index, run)| {
            let (x, y) = run.anchor();
            let placement = Placement::from_pdf_anchor(viewport, x, y, run.height);
            TextItem::extracted(format!("{}_{}", page_number, index), &run.text, placement)
        })
        .collect();

    Page {
        texts,
        ..Page::for_viewport(page_number, viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_hello_run() {
        let viewport = Viewport::new(612.0, 792.0, 1.5);
        let runs = vec![TextRun::new("Hello", [1.0, 0.0, 0.0, 1.0, 100.0, 700.0], 12.0)];

        let page = extract_page(1, &viewport, &runs);
        assert_eq!(page.texts.len(), 1);

        let item = &page.texts[0];
        assert_eq!(item.id, "1_0");
        assert_eq!(item.content, "Hello");
        assert_eq!(item.original_content, "Hello");
        assert_eq!(item.placement.original_x(), 100.0);
        assert_eq!(item.placement.original_y(), 700.0);
        assert_eq!(item.placement.original_size(), 12.0);
        assert_eq!(item.placement.ui_font_size(), 18.0);
        assert!(!item.modified && !item.is_new && !item.is_hidden);
    }

    #[test]
    fn test_blank_runs_are_skipped_and_ids_stay_dense() {
        let viewport = Viewport::new(612.0, 792.0, 1.0);
        let runs = vec![
            TextRun::new("  ", [1.0, 0.0, 0.0, 1.0, 0.0, 0.0], 10.0),
            TextRun::new("first", [1.0, 0.0, 0.0, 1.0, 10.0, 10.0], 10.0),
            TextRun::new("", [1.0, 0.0, 0.0, 1.0, 0.0, 0.0], 10.0),
            TextRun::new("second", [1.0, 0.0, 0.0, 1.0, 20.0, 20.0], 10.0),
        ];

        let page = extract_page(3, &viewport, &runs);
        let ids: Vec<_> = page.texts.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["3_0", "3_1"]);
        assert_eq!(page.texts[1].content, "second");
    }

    #[test]
    fn test_page_dimensions_are_unscaled() {
        let viewport = Viewport::new(595.0, 842.0, 2.0);
        let page = extract_page(2, &viewport, &[]);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.original_width, 595.0);
        assert_eq!(page.original_height, 842.0);
        assert!(page.texts.is_empty());
    }

    #[test]
    fn test_run_json_matches_renderer_shape() {
        let json = r#"{"str":"Hi","transform":[12,0,0,12,50,60],"height":12}"#;
        let run: TextRun = serde_json::from_str(json).unwrap();
        assert_eq!(run.text, "Hi");
        assert_eq!(run.anchor(), (50.0, 60.0));
    }
}
