use thiserror::Error;

/// Export failure. Nothing is written to disk when one of these is returned.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid export options: {0}")]
    InvalidOptions(String),

    /// Text the configured font cannot encode.
    #[error("unsupported content: {character:?} cannot be printed with {font}")]
    UnsupportedContent { character: char, font: &'static str },

    /// A block taller than a page with no line to break it on.
    #[error("content block of {height:.0}px cannot be split to fit a {limit:.0}px page")]
    ContentTooTall { height: f32, limit: f32 },

    #[error("font error: {0}")]
    Font(String),

    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export task failed: {0}")]
    Task(String),
}

impl ExportError {
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }

    /// Whether retrying (possibly after editing the invoice) can succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidOptions(_))
    }
}
