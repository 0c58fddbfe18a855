use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Page {0} not found")]
    PageNotFound(u32),

    #[error("Failed to render page {page}: {message}")]
    Render { page: u32, message: String },

    /// A newer render of the same page superseded this one, or the page view went away.
    #[error("Rendering of page {0} was cancelled")]
    RenderCancelled(u32),

    #[error("Failed to save PDF: {0}")]
    Persistence(String),

    #[error("Text correction failed: {0}")]
    Correction(String),

    #[error("Another {0} is already in progress")]
    Busy(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid {field}: {value}")]
    InvalidStyle { field: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EditorError {
    /// Cancellation is the expected outcome of a superseded render and is not reported.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, EditorError::RenderCancelled(_))
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::Serialization(err.to_string())
    }
}

impl From<lopdf::Error> for EditorError {
    fn from(err: lopdf::Error) -> Self {
        EditorError::Parse(err.to_string())
    }
}
