use thiserror::Error;

/// Failure of the document extraction layer.
///
/// `DocumentExtractor::extract` only surfaces `NoContent` (both text strategies ran
/// and recovered nothing) or `Io` (the file itself is unreadable). The other variants
/// describe sub-failures that are logged, recorded in diagnostics, and skipped.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no content extracted")]
    NoContent,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("text layer error: {0}")]
    Text(#[from] pdf_extract::OutputError),

    #[error("rasterization failed: {0}")]
    Raster(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl ExtractionError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        ExtractionError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
