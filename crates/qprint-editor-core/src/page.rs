use crate::coords::Viewport;
use crate::text_item::TextItem;
use serde::{Deserialize, Serialize};

/// One page of the document being edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based, matches the source PDF
    pub page_number: u32,
    /// Unscaled width in PDF points
    pub original_width: f64,
    /// Unscaled height in PDF points
    pub original_height: f64,
    /// Lower-left corner of the media box, when it is not the origin
    #[serde(default, skip_serializing_if = "is_zero")]
    pub origin_x: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub origin_y: f64,
    pub texts: Vec<TextItem>,
}

impl Page {
    pub fn new(page_number: u32, original_width: f64, original_height: f64) -> Self {
        Self {
            page_number,
            original_width,
            original_height,
            origin_x: 0.0,
            origin_y: 0.0,
            texts: Vec::new(),
        }
    }

    /// Empty page covering the viewport's media box
    pub fn for_viewport(page_number: u32, viewport: &Viewport) -> Self {
        let [origin_x, origin_y, width, height] = viewport.media_box;
        Self {
            origin_x,
            origin_y,
            ..Self::new(page_number, width, height)
        }
    }

    pub fn viewport(&self, scale: f64) -> Viewport {
        Viewport::with_media_box(
            [
                self.origin_x,
                self.origin_y,
                self.original_width,
                self.original_height,
            ],
            scale,
        )
    }

    pub fn text(&self, text_id: &str) -> Option<&TextItem> {
        self.texts.iter().find(|t| t.id == text_id)
    }

    pub fn text_mut(&mut self, text_id: &str) -> Option<&mut TextItem> {
        self.texts.iter_mut().find(|t| t.id == text_id)
    }

    /// Items that are rendered (not soft-deleted)
    pub fn visible_texts(&self) -> impl Iterator<Item = &TextItem> {
        self.texts.iter().filter(|t| !t.is_hidden)
    }
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}
