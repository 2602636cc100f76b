//! PDF text-layer reading.

use lopdf::Document;
use tracing::debug;

use crate::ExtractionError;

/// Reads the text layer of a PDF, one string per page in page order.
pub trait PdfReader: Send + Sync {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Pure-Rust PDF reader backed by lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfReader;

impl PdfReader for LopdfReader {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let document = Document::load_mem(bytes)?;
        let pages = document.get_pages();
        debug!(pages = pages.len(), "loaded PDF");

        let mut texts = Vec::with_capacity(pages.len());
        for &page_number in pages.keys() {
            texts.push(document.extract_text(&[page_number])?);
        }
        Ok(texts)
    }
}
