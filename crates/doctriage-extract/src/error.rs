use std::path::PathBuf;

use thiserror::Error;

/// Failure of the OCR engine itself (as opposed to an image it could not read).
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to launch OCR engine {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to exchange data with OCR engine: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode image for OCR: {0}")]
    Encode(#[source] image::ImageError),

    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type: {filename}")]
    UnsupportedType { filename: String },

    #[error("failed to read PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
}
