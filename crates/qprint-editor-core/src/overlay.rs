//! Positioned, styled nodes for the editable layer over a rendered page

use crate::store::EditorStore;
use serde::Serialize;

/// Size of the canvas and overlay box for one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFrame {
    pub page_number: u32,
    pub width: f64,
    pub height: f64,
}

/// One absolutely positioned editable text box
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayNode {
    pub id: String,
    pub content: String,
    pub left: f64,
    pub top: f64,
    pub font_size: f64,
    pub font_family: &'static str,
    pub font_weight: &'static str,
    pub font_style: &'static str,
    pub text_decoration: &'static str,
    pub color: String,
    pub selected: bool,
    pub modified: bool,
}

pub fn page_frame(store: &EditorStore, page_index: usize) -> Option<PageFrame> {
    let page = store.page(page_index)?;
    let viewport = page.viewport(store.scale());
    Some(PageFrame {
        page_number: page.page_number,
        width: viewport.width(),
        height: viewport.height(),
    })
}

/// Nodes for every visible item on a page, in document order
pub fn overlay_nodes(store: &EditorStore, page_index: usize) -> Vec<OverlayNode> {
    let Some(page) = store.page(page_index) else {
        return Vec::new();
    };
    let selected_id = store
        .selection()
        .filter(|s| s.page_index == page_index)
        .map(|s| s.text_id.as_str());

    page.visible_texts()
        .map(|text| {
            let style = &text.style;
            OverlayNode {
                id: text.id.clone(),
                content: text.content.clone(),
                left: text.placement.ui_x(),
                top: text.placement.ui_y(),
                font_size: text.placement.ui_font_size(),
                font_family: style.font_family.css_name(),
                font_weight: style.font_weight.css_name(),
                font_style: style.font_style.css_name(),
                text_decoration: style.text_decoration.css_name(),
                color: style.color.to_string(),
                selected: selected_id == Some(text.id.as_str()),
                modified: text.modified,
            }
        })
        .collect()
}
