use pdf_progress::TaskError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PressError {
    #[error("Page index {index} out of range for a source of {len} pages")]
    OutOfRange { index: usize, len: usize },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    /// A worker error forwarded through a task, displayed exactly as the original
    #[error(transparent)]
    Propagated(#[from] TaskError<PressError>),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Failure reported by a rendering provider
    #[error("Render error: {0}")]
    Render(String),
}

#[cfg(feature = "pdfium")]
impl From<pdfium_render::prelude::PdfiumError> for PressError {
    fn from(err: pdfium_render::prelude::PdfiumError) -> Self {
        PressError::Render(err.to_string())
    }
}

impl PressError {
    /// The error raised inside the worker, looking through task propagation
    pub fn root(&self) -> &PressError {
        match self {
            PressError::Propagated(TaskError::Failed(inner)) => inner.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PressError>;

/// Clockwise rotation applied when placing an image on an output page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// The same rotation turned a further 180°
    pub fn half_turn(self) -> Self {
        match self {
            Rotation::None => Rotation::Clockwise180,
            Rotation::Clockwise90 => Rotation::Clockwise270,
            Rotation::Clockwise180 => Rotation::None,
            Rotation::Clockwise270 => Rotation::Clockwise90,
        }
    }

    /// Whether the placed image has its width and height swapped
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// Statistics about a midpage imposition
#[derive(Debug, Clone, PartialEq)]
pub struct PressStatistics {
    /// Total number of source pages
    pub source_pages: usize,
    /// Physical sheets needed (one per output page when single-sided)
    pub output_sheets: usize,
    /// Output page count
    pub output_pages: usize,
    /// Number of blank pages added for padding
    pub blank_pages_added: usize,
    /// Number of stacks, when partitioned
    pub stacks: Option<usize>,
}
