//! Coordinate transformation between PDF user space and viewport space
//!
//! PDF space has its origin at the bottom-left of the page with y growing
//! upward, in points. Viewport space has its origin at the top-left of the
//! rendered page with y growing downward, in pixels. `scale` is the number of
//! rendered pixels per PDF point.
//!
//! Every conversion in the editor (extraction, clicks, drags) goes through
//! [`Viewport`] so positions never drift between the two spaces.

use serde::{Deserialize, Serialize};

/// A page rendered at a given scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Render pixels per PDF point
    pub scale: f64,
    /// Page box in PDF space: `[x, y, width, height]`
    pub media_box: [f64; 4],
}

impl Viewport {
    /// Viewport for a page whose media box starts at the origin
    pub fn new(page_width: f64, page_height: f64, scale: f64) -> Self {
        Self {
            scale,
            media_box: [0.0, 0.0, page_width, page_height],
        }
    }

    pub fn with_media_box(media_box: [f64; 4], scale: f64) -> Self {
        Self { scale, media_box }
    }

    /// Unscaled page width in PDF points
    pub fn page_width(&self) -> f64 {
        self.media_box[2]
    }

    /// Unscaled page height in PDF points
    pub fn page_height(&self) -> f64 {
        self.media_box[3]
    }

    /// Rendered width in pixels
    pub fn width(&self) -> f64 {
        self.page_width() * self.scale
    }

    /// Rendered height in pixels
    pub fn height(&self) -> f64 {
        self.page_height() * self.scale
    }

    /// Convert a PDF-space point to viewport pixels
    pub fn to_viewport(&self, pdf_x: f64, pdf_y: f64) -> (f64, f64) {
        let [mb_x, mb_y, _, mb_height] = self.media_box;
        let ui_x = (pdf_x - mb_x) * self.scale;
        let ui_y = (mb_y + mb_height - pdf_y) * self.scale;
        (ui_x, ui_y)
    }

    /// Convert viewport pixels back to a PDF-space point
    pub fn to_pdf(&self, ui_x: f64, ui_y: f64) -> (f64, f64) {
        let [mb_x, mb_y, _, mb_height] = self.media_box;
        let pdf_x = mb_x + ui_x / self.scale;
        let pdf_y = mb_y + mb_height - ui_y / self.scale;
        (pdf_x, pdf_y)
    }

    /// Same page at a different scale
    pub fn rescaled(&self, scale: f64) -> Self {
        Self {
            scale,
            media_box: self.media_box,
        }
    }
}

/// Convert PDF coordinates (bottom-left origin, points) to viewport coordinates
/// (top-left origin, pixels) for a page whose media box starts at the origin
pub fn to_viewport(pdf_x: f64, pdf_y: f64, scale: f64, page_height: f64) -> (f64, f64) {
    (pdf_x * scale, (page_height - pdf_y) * scale)
}

/// Convert viewport coordinates back to PDF coordinates
pub fn to_pdf(ui_x: f64, ui_y: f64, scale: f64, page_height: f64) -> (f64, f64) {
    (ui_x / scale, page_height - ui_y / scale)
}
