//! Editor configuration
//!
//! Every field has a default, so an empty TOML document (or
//! `EditorConfig::default()`) gives the stock editor.
//!
//! ```toml
//! scale = 1.5
//! history_depth = 20
//! api_base = "/api"
//!
//! [text]
//! inserted_font_size = 14.0
//! font_size_step = 2.0
//!
//! [layout]
//! page_gap = 32.0
//! root_margin = 400.0
//! ```

use crate::error::EditorError;
use crate::history::DEFAULT_HISTORY_DEPTH;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Render pixels per PDF point
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Maximum undo (and redo) entries kept
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Prefix of the draft REST API
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            history_depth: default_history_depth(),
            api_base: default_api_base(),
            text: TextConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, EditorError> {
        let config: Self = toml::from_str(s).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Every size must be finite; scales and font sizes must be positive.
    pub fn validate(&self) -> Result<(), EditorError> {
        positive("scale", self.scale)?;
        if self.history_depth == 0 {
            return Err(EditorError::Config(
                "history_depth must be at least 1".to_string(),
            ));
        }

        let text = &self.text;
        positive("inserted_font_size", text.inserted_font_size)?;
        positive("font_size_step", text.font_size_step)?;
        positive("min_ui_font_size", text.min_ui_font_size)?;
        positive("max_ui_font_size", text.max_ui_font_size)?;
        if text.min_ui_font_size > text.max_ui_font_size {
            return Err(EditorError::Config(format!(
                "font size bounds {}..{} are invalid",
                text.min_ui_font_size, text.max_ui_font_size
            )));
        }

        let layout = &self.layout;
        non_negative("page_gap", layout.page_gap)?;
        non_negative("root_margin", layout.root_margin)?;
        positive("placeholder_width", layout.placeholder_width)?;
        positive("placeholder_height", layout.placeholder_height)?;
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<(), EditorError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EditorError::Config(format!(
            "{} must be positive, got {}",
            field, value
        )))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), EditorError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EditorError::Config(format!(
            "{} must not be negative, got {}",
            field, value
        )))
    }
}

fn default_scale() -> f64 {
    1.5
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

fn default_api_base() -> String {
    "/api".to_string()
}

/// Defaults for placed text and the size controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    /// PDF point size of newly placed text
    #[serde(default = "default_inserted_font_size")]
    pub inserted_font_size: f64,
    #[serde(default = "default_inserted_content")]
    pub inserted_content: String,
    /// Viewport pixels added or removed per size step
    #[serde(default = "default_font_size_step")]
    pub font_size_step: f64,
    #[serde(default = "default_min_ui_font_size")]
    pub min_ui_font_size: f64,
    #[serde(default = "default_max_ui_font_size")]
    pub max_ui_font_size: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            inserted_font_size: default_inserted_font_size(),
            inserted_content: default_inserted_content(),
            font_size_step: default_font_size_step(),
            min_ui_font_size: default_min_ui_font_size(),
            max_ui_font_size: default_max_ui_font_size(),
        }
    }
}

fn default_inserted_font_size() -> f64 {
    14.0
}

fn default_inserted_content() -> String {
    "New Text".to_string()
}

fn default_font_size_step() -> f64 {
    2.0
}

fn default_min_ui_font_size() -> f64 {
    8.0
}

fn default_max_ui_font_size() -> f64 {
    120.0
}

/// Vertical page stacking and lazy rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Pixels between stacked pages
    #[serde(default = "default_page_gap")]
    pub page_gap: f64,
    /// Pixels beyond the scroll viewport in which pages are still rendered
    #[serde(default = "default_root_margin")]
    pub root_margin: f64,
    /// Size assumed for pages whose dimensions are not known yet
    #[serde(default = "default_placeholder_width")]
    pub placeholder_width: f64,
    #[serde(default = "default_placeholder_height")]
    pub placeholder_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_gap: default_page_gap(),
            root_margin: default_root_margin(),
            placeholder_width: default_placeholder_width(),
            placeholder_height: default_placeholder_height(),
        }
    }
}

fn default_page_gap() -> f64 {
    32.0
}

fn default_root_margin() -> f64 {
    400.0
}

fn default_placeholder_width() -> f64 {
    600.0
}

fn default_placeholder_height() -> f64 {
    800.0
}
