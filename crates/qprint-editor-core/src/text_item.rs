//! Editable text fragments
//!
//! A [`TextItem`] is either extracted from the source PDF or placed by the
//! user. Its position lives in a [`Placement`], which can only be built through
//! a [`Viewport`] so the PDF and viewport representations never disagree.
//!
//! The JSON shape (camelCase, placement and style flattened) is the one the
//! draft API's text-correction endpoints accept and return.

use crate::coords::Viewport;
use crate::style::{StylePatch, TextStyle};
use serde::{Deserialize, Serialize};

pub type TextId = String;

/// Position and size of a text item in both coordinate spaces.
///
/// `original_x`/`original_y` is the baseline anchor in PDF space;
/// `ui_x`/`ui_y` is the top-left corner of the glyph box in viewport pixels,
/// i.e. the viewport image of the anchor shifted up by `ui_font_size`.
/// `ui_font_size == original_size * scale` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    original_x: f64,
    original_y: f64,
    original_size: f64,
    ui_x: f64,
    ui_y: f64,
    ui_font_size: f64,
}

impl Placement {
    /// Placement for text whose baseline sits at `(pdf_x, pdf_y)`.
    pub fn from_pdf_anchor(viewport: &Viewport, pdf_x: f64, pdf_y: f64, pdf_size: f64) -> Self {
        let (ui_x, baseline_y) = viewport.to_viewport(pdf_x, pdf_y);
        let ui_font_size = pdf_size * viewport.scale;
        Self {
            original_x: pdf_x,
            original_y: pdf_y,
            original_size: pdf_size,
            ui_x,
            ui_y: baseline_y - ui_font_size,
            ui_font_size,
        }
    }

    /// Placement for text whose glyph box top-left sits at `(ui_x, ui_y)`.
    pub fn from_ui_top_left(viewport: &Viewport, ui_x: f64, ui_y: f64, pdf_size: f64) -> Self {
        let ui_font_size = pdf_size * viewport.scale;
        let (original_x, original_y) = viewport.to_pdf(ui_x, ui_y + ui_font_size);
        Self {
            original_x,
            original_y,
            original_size: pdf_size,
            ui_x,
            ui_y,
            ui_font_size,
        }
    }

    /// Translate by a viewport-space delta
    pub fn moved_by(&self, viewport: &Viewport, dx: f64, dy: f64) -> Self {
        Self::from_ui_top_left(
            viewport,
            self.ui_x + dx,
            self.ui_y + dy,
            self.original_size,
        )
    }

    /// Resize keeping the PDF baseline anchor fixed
    pub fn with_font_size(&self, viewport: &Viewport, pdf_size: f64) -> Self {
        Self::from_pdf_anchor(viewport, self.original_x, self.original_y, pdf_size)
    }

    /// Recompute the viewport half for a new scale
    pub fn rescaled(&self, viewport: &Viewport) -> Self {
        Self::from_pdf_anchor(
            viewport,
            self.original_x,
            self.original_y,
            self.original_size,
        )
    }

    pub fn original_x(&self) -> f64 {
        self.original_x
    }

    pub fn original_y(&self) -> f64 {
        self.original_y
    }

    pub fn original_size(&self) -> f64 {
        self.original_size
    }

    pub fn ui_x(&self) -> f64 {
        self.ui_x
    }

    pub fn ui_y(&self) -> f64 {
        self.ui_y
    }

    pub fn ui_font_size(&self) -> f64 {
        self.ui_font_size
    }

    pub fn position(&self) -> Position {
        Position {
            original_x: self.original_x,
            original_y: self.original_y,
            ui_x: self.ui_x,
            ui_y: self.ui_y,
        }
    }

    fn with_position(&self, position: &Position) -> Self {
        Self {
            original_x: position.original_x,
            original_y: position.original_y,
            ui_x: position.ui_x,
            ui_y: position.ui_y,
            ..*self
        }
    }
}

/// Both halves of a position update. Built from a [`Placement`] so the two
/// coordinate pairs always arrive together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub original_x: f64,
    pub original_y: f64,
    pub ui_x: f64,
    pub ui_y: f64,
}

impl From<Placement> for Position {
    fn from(placement: Placement) -> Self {
        placement.position()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    pub id: TextId,
    /// Text as extracted; empty for inserted items
    pub original_content: String,
    pub content: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(flatten)]
    pub style: TextStyle,
    /// Touched since extraction
    pub modified: bool,
    /// Soft-deleted: never rendered or saved
    pub is_hidden: bool,
    /// Not present in the source PDF
    pub is_new: bool,
}

impl TextItem {
    /// Item extracted from the source PDF
    pub fn extracted(id: impl Into<TextId>, content: &str, placement: Placement) -> Self {
        Self {
            id: id.into(),
            original_content: content.to_string(),
            content: content.to_string(),
            placement,
            style: TextStyle::default(),
            modified: false,
            is_hidden: false,
            is_new: false,
        }
    }

    /// Item placed by the user; counts as modified from the start
    pub fn inserted(content: &str, placement: Placement) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            original_content: String::new(),
            content: content.to_string(),
            placement,
            style: TextStyle::inserted(),
            modified: true,
            is_hidden: false,
            is_new: true,
        }
    }

    pub(crate) fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.modified = true;
    }

    pub(crate) fn apply_style(&mut self, patch: &StylePatch) {
        self.style = self.style.merged(patch);
        self.modified = true;
    }

    pub(crate) fn set_position(&mut self, position: &Position) {
        self.placement = self.placement.with_position(position);
        self.modified = true;
    }

    pub(crate) fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
        self.modified = true;
    }

    /// Whether this item belongs in a save request
    pub fn is_pending_save(&self) -> bool {
        self.modified && !self.is_hidden && !self.content.trim().is_empty()
    }
}
