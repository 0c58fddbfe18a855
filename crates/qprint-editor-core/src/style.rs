//! Text styling for overlay items
//!
//! Style values are a closed set serialized as the CSS / PDF strings the
//! browser and the draft API exchange, so a typo fails at parse time instead
//! of rendering silently wrong.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    #[serde(rename = "sans-serif")]
    SansSerif,
    #[serde(rename = "serif")]
    Serif,
    #[serde(rename = "monospace")]
    Monospace,
    #[serde(rename = "Helvetica")]
    Helvetica,
    #[serde(rename = "Times-Roman", alias = "Times")]
    TimesRoman,
    #[serde(rename = "Courier")]
    Courier,
}

impl FontFamily {
    /// Value for the CSS `font-family` property
    pub fn css_name(&self) -> &'static str {
        match self {
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "monospace",
            FontFamily::Helvetica => "Helvetica, Arial, sans-serif",
            FontFamily::TimesRoman => "\"Times New Roman\", Times, serif",
            FontFamily::Courier => "\"Courier New\", Courier, monospace",
        }
    }

    /// Base font of the PDF standard 14 set this family renders with
    fn pdf_base(&self) -> &'static str {
        match self {
            FontFamily::SansSerif | FontFamily::Helvetica => "Helvetica",
            FontFamily::Serif | FontFamily::TimesRoman => "Times",
            FontFamily::Monospace | FontFamily::Courier => "Courier",
        }
    }
}

impl FromStr for FontFamily {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sans-serif" => Ok(FontFamily::SansSerif),
            "serif" => Ok(FontFamily::Serif),
            "monospace" => Ok(FontFamily::Monospace),
            "Helvetica" => Ok(FontFamily::Helvetica),
            "Times-Roman" | "Times" => Ok(FontFamily::TimesRoman),
            "Courier" => Ok(FontFamily::Courier),
            other => Err(EditorError::InvalidStyle {
                field: "font family",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn css_name(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn css_name(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextDecoration {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "underline")]
    Underline,
    #[serde(rename = "line-through")]
    LineThrough,
}

impl TextDecoration {
    pub fn css_name(&self) -> &'static str {
        match self {
            TextDecoration::None => "none",
            TextDecoration::Underline => "underline",
            TextDecoration::LineThrough => "line-through",
        }
    }
}

/// An sRGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    /// Neutral dark slate used for extracted text
    pub const SLATE: Color = Color::rgb(0x33, 0x41, 0x55);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = EditorError;

    /// Accepts `#rgb` and `#rrggbb` (the leading `#` is optional)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EditorError::InvalidColor(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = EditorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Complete style of a text item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: FontFamily,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub color: Color,
}

impl Default for TextStyle {
    /// Style given to text extracted from the source PDF
    fn default() -> Self {
        Self {
            font_family: FontFamily::SansSerif,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            color: Color::SLATE,
        }
    }
}

impl TextStyle {
    /// Style given to text boxes the user places
    pub fn inserted() -> Self {
        Self {
            color: Color::BLACK,
            ..Self::default()
        }
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.font_style == FontStyle::Italic
    }

    /// Name of the PDF standard 14 font matching family, weight and style.
    pub fn pdf_font_name(&self) -> &'static str {
        match (self.font_family.pdf_base(), self.is_bold(), self.is_italic()) {
            ("Times", true, true) => "Times-BoldItalic",
            ("Times", true, false) => "Times-Bold",
            ("Times", false, true) => "Times-Italic",
            ("Times", false, false) => "Times-Roman",
            ("Courier", true, true) => "Courier-BoldOblique",
            ("Courier", true, false) => "Courier-Bold",
            ("Courier", false, true) => "Courier-Oblique",
            ("Courier", false, false) => "Courier",
            (_, true, true) => "Helvetica-BoldOblique",
            (_, true, false) => "Helvetica-Bold",
            (_, false, true) => "Helvetica-Oblique",
            (_, false, false) => "Helvetica",
        }
    }

    /// Shallow merge: fields present in the patch win
    pub fn merged(&self, patch: &StylePatch) -> Self {
        Self {
            font_family: patch.font_family.unwrap_or(self.font_family),
            font_weight: patch.font_weight.unwrap_or(self.font_weight),
            font_style: patch.font_style.unwrap_or(self.font_style),
            text_decoration: patch.text_decoration.unwrap_or(self.text_decoration),
            color: patch.color.unwrap_or(self.color),
        }
    }
}

/// Partial style update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<TextDecoration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        *self == StylePatch::default()
    }

    pub fn font_family(family: FontFamily) -> Self {
        Self {
            font_family: Some(family),
            ..Self::default()
        }
    }

    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// Flip bold relative to `current`
    pub fn toggle_bold(current: &TextStyle) -> Self {
        let weight = if current.is_bold() {
            FontWeight::Normal
        } else {
            FontWeight::Bold
        };
        Self {
            font_weight: Some(weight),
            ..Self::default()
        }
    }

    /// Flip italic relative to `current`
    pub fn toggle_italic(current: &TextStyle) -> Self {
        let style = if current.is_italic() {
            FontStyle::Normal
        } else {
            FontStyle::Italic
        };
        Self {
            font_style: Some(style),
            ..Self::default()
        }
    }

    /// Flip underline relative to `current`
    pub fn toggle_underline(current: &TextStyle) -> Self {
        let decoration = if current.text_decoration == TextDecoration::Underline {
            TextDecoration::None
        } else {
            TextDecoration::Underline
        };
        Self {
            text_decoration: Some(decoration),
            ..Self::default()
        }
    }
}
