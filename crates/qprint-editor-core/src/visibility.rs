//! Which pages of a long document are near enough to the scroll position to render

use crate::config::LayoutConfig;
use serde::Serialize;

/// Vertical extent of one stacked page, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSlot {
    pub page_number: u32,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PageSlot {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Pages stacked top to bottom with a fixed gap between them
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    slots: Vec<PageSlot>,
    root_margin: f64,
}

impl PageLayout {
    /// `sizes[i]` is the unscaled size of page `i + 1` in PDF points, or
    /// `None` while unknown (a fixed placeholder box is used instead).
    pub fn new(sizes: &[Option<(f64, f64)>], scale: f64, config: &LayoutConfig) -> Self {
        let mut top = 0.0;
        let slots = sizes
            .iter()
            .zip(1u32..)
            .map(|(size, page_number)| {
                let (width, height) = match size {
                    Some((w, h)) => (w * scale, h * scale),
                    None => (config.placeholder_width, config.placeholder_height),
                };
                let slot = PageSlot {
                    page_number,
                    top,
                    width,
                    height,
                };
                top += height + config.page_gap;
                slot
            })
            .collect();

        Self {
            slots,
            root_margin: config.root_margin,
        }
    }

    pub fn slots(&self) -> &[PageSlot] {
        &self.slots
    }

    pub fn total_height(&self) -> f64 {
        self.slots.last().map(PageSlot::bottom).unwrap_or(0.0)
    }

    /// Pages intersecting the scroll viewport grown by the root margin
    pub fn visible_pages(&self, scroll_top: f64, viewport_height: f64) -> Vec<u32> {
        let from = scroll_top - self.root_margin;
        let to = scroll_top + viewport_height + self.root_margin;
        self.slots
            .iter()
            .filter(|slot| slot.bottom() > from && slot.top < to)
            .map(|slot| slot.page_number)
            .collect()
    }
}
