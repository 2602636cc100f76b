//! Text extraction: PDF text layers via lopdf, raster images via grayscale OCR.

mod error;
mod extractor;
mod ocr;
mod pdf;

pub use error::{ExtractionError, OcrError};
pub use extractor::{FileKind, SUPPORTED_EXTENSIONS, TextExtractor, is_supported};
pub use ocr::{OcrEngine, TesseractEngine};
pub use pdf::{LopdfReader, PdfReader};
