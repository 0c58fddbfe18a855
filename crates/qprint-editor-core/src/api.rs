//! Draft REST API: endpoints and JSON bodies
//!
//! The transport lives with the caller (browser `fetch` in the wasm app);
//! this module only knows URLs and payload shapes.

use crate::page::Page;
use crate::text_item::TextItem;
use serde::{Deserialize, Serialize};

/// URL builder for the print-draft endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEndpoints {
    base: String,
}

impl DraftEndpoints {
    pub fn new(api_base: &str) -> Self {
        Self {
            base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// `GET` draft metadata
    pub fn draft(&self, draft_id: &str) -> String {
        format!("{}/print-drafts/{}", self.base, draft_id)
    }

    /// `POST` multipart upload of a new source PDF
    pub fn upload(&self) -> String {
        format!("{}/print-drafts/upload", self.base)
    }

    /// `POST` edited text items
    pub fn process(&self, draft_id: &str) -> String {
        format!("{}/print-drafts/{}/process", self.base, draft_id)
    }

    pub fn spell_fix(&self, draft_id: &str) -> String {
        format!("{}/print-drafts/{}/spell-fix", self.base, draft_id)
    }

    pub fn format_clean(&self, draft_id: &str) -> String {
        format!("{}/print-drafts/{}/format-clean", self.base, draft_id)
    }
}

/// Client route shown after a successful save
pub fn preview_route(draft_id: &str) -> String {
    format!("/student/preview/{}", draft_id)
}

/// Client route of the editor for a draft
pub fn editor_route(draft_id: &str) -> String {
    format!("/student/editor/{}", draft_id)
}

/// Response of `GET /print-drafts/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub file_name: String,
    /// Time-limited URL of the source PDF
    pub signed_url: String,
}

/// Response of `POST /print-drafts/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub draft_id: String,
}

/// One edited item as the process endpoint expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveItem {
    pub text: String,
    /// PDF-space baseline anchor
    pub x: f64,
    pub y: f64,
    /// PDF-space font size
    pub size: f64,
    pub page_num: u32,
    pub is_new: bool,
    /// PDF standard 14 font name
    pub font_family: String,
    pub font_weight: String,
    pub font_style: String,
    pub text_decoration: String,
    pub color: String,
}

impl SaveItem {
    pub fn from_item(page_number: u32, item: &TextItem) -> Self {
        let style = &item.style;
        Self {
            text: item.content.clone(),
            x: item.placement.original_x(),
            y: item.placement.original_y(),
            size: item.placement.original_size(),
            page_num: page_number,
            is_new: item.is_new,
            font_family: style.pdf_font_name().to_string(),
            font_weight: style.font_weight.css_name().to_string(),
            font_style: style.font_style.css_name().to_string(),
            text_decoration: style.text_decoration.css_name().to_string(),
            color: style.color.to_string(),
        }
    }
}

/// Items to send on save: modified, visible and non-blank
pub fn collect_save_items(pages: &[Page]) -> Vec<SaveItem> {
    pages
        .iter()
        .flat_map(|page| {
            page.texts
                .iter()
                .filter(|item| item.is_pending_save())
                .map(move |item| SaveItem::from_item(page.page_number, item))
        })
        .collect()
}

/// Body of `POST /print-drafts/{id}/process`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub updated_text_items: Vec<SaveItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    #[serde(default)]
    pub success: bool,
}

/// Which text-correction service to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionTask {
    SpellFix,
    FormatClean,
}

impl CorrectionTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionTask::SpellFix => "spell_fix",
            CorrectionTask::FormatClean => "format_clean",
        }
    }

    pub fn endpoint(&self, endpoints: &DraftEndpoints, draft_id: &str) -> String {
        match self {
            CorrectionTask::SpellFix => endpoints.spell_fix(draft_id),
            CorrectionTask::FormatClean => endpoints.format_clean(draft_id),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "spell_fix" | "spellfix" | "spell-fix" => Some(CorrectionTask::SpellFix),
            "format_clean" | "formatclean" | "format-clean" => Some(CorrectionTask::FormatClean),
            _ => None,
        }
    }
}

/// Body of the text-correction endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRequest {
    pub pages: Vec<Page>,
}

/// Response of the text-correction endpoints; `pages` is absent when nothing changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResponse {
    #[serde(default)]
    pub pages: Option<Vec<Page>>,
}
