//! Extension-dispatched text extraction.

use doctriage_core::{Document, ExtractedText, OcrConfig};
use tracing::{info, warn};

use crate::{ExtractionError, LopdfReader, OcrEngine, PdfReader, TesseractEngine};

/// File extensions the extractor accepts (lowercase, no dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// Extraction path selected from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
}

impl FileKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        match Document::new(&[], filename).extension()?.as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" | "png" => Some(Self::Image),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

/// Whether `filename` has an extension the extractor can handle.
pub fn is_supported(filename: &str) -> bool {
    FileKind::from_filename(filename).is_some()
}

/// Converts documents into normalised text.
///
/// The PDF reader and OCR engine are injected so callers can swap in other
/// engines; [`TextExtractor::with_tesseract`] wires up the defaults.
pub struct TextExtractor {
    pdf: Box<dyn PdfReader>,
    ocr: Box<dyn OcrEngine>,
}

impl TextExtractor {
    pub fn new(pdf: Box<dyn PdfReader>, ocr: Box<dyn OcrEngine>) -> Self {
        Self { pdf, ocr }
    }

    /// lopdf for PDFs, tesseract for images.
    pub fn with_tesseract(config: OcrConfig) -> Self {
        Self::new(Box::new(LopdfReader), Box::new(TesseractEngine::new(config)))
    }

    /// Extract trimmed, lowercased text from a document.
    ///
    /// Whitespace-only output is [`ExtractedText::NoText`], not an error.
    /// The document bytes are only borrowed.
    pub fn extract(&self, document: &Document<'_>) -> Result<ExtractedText, ExtractionError> {
        let kind = FileKind::from_filename(document.filename).ok_or_else(|| {
            ExtractionError::UnsupportedType {
                filename: document.filename.to_string(),
            }
        })?;

        let raw = match kind {
            FileKind::Pdf => self.pdf.page_texts(document.bytes)?.join(" "),
            FileKind::Image => self.ocr_image(document.bytes)?,
        };

        let text = ExtractedText::normalize(&raw);
        match &text {
            ExtractedText::Text(s) => info!(
                filename = document.filename,
                kind = kind.as_str(),
                chars = s.chars().count(),
                "extracted text"
            ),
            ExtractedText::NoText => warn!(
                filename = document.filename,
                kind = kind.as_str(),
                "no text extracted"
            ),
        }
        Ok(text)
    }

    fn ocr_image(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let image = image::load_from_memory(bytes)?;
        // Single channel reads better than colour for printed documents.
        let gray = image.to_luma8();
        Ok(self.ocr.recognize(&gray)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OcrError;
    use crate::pdf::tests::pdf_with_pages;
    use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    /// OCR stub returning canned text and remembering the images it saw.
    #[derive(Clone, Default)]
    struct StubOcr {
        text: String,
        seen: Arc<Mutex<Vec<(u32, u32)>>>,
    }

    impl StubOcr {
        fn returning(text: &str) -> Self {
            Self {
                text: text.to_string(),
                ..Self::default()
            }
        }
    }

    impl OcrEngine for StubOcr {
        fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
            self.seen.lock().unwrap().push(image.dimensions());
            Ok(self.text.clone())
        }
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn recognize(&self, _image: &GrayImage) -> Result<String, OcrError> {
            Err(OcrError::Failed {
                status: "exit status: 1".into(),
                stderr: "Error opening data file".into(),
            })
        }
    }

    fn extractor(ocr: impl OcrEngine + 'static) -> TextExtractor {
        TextExtractor::new(Box::new(LopdfReader), Box::new(ocr))
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 6, image::Rgb([250, 250, 250]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn file_kind_dispatch() {
        assert_eq!(FileKind::from_filename("scan.PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_filename("a.jpg"), Some(FileKind::Image));
        assert_eq!(FileKind::from_filename("a.JPEG"), Some(FileKind::Image));
        assert_eq!(FileKind::from_filename("a.png"), Some(FileKind::Image));
        assert_eq!(FileKind::from_filename("a.txt"), None);
        assert_eq!(FileKind::from_filename("pdf"), None);
    }

    #[test]
    fn supported_extensions() {
        for ext in SUPPORTED_EXTENSIONS {
            assert!(is_supported(&format!("file.{ext}")));
        }
        assert!(!is_supported("file.txt"));
        assert!(!is_supported("file"));
    }

    #[test]
    fn unsupported_extension_errors() {
        let ex = extractor(StubOcr::default());
        let result = ex.extract(&Document::new(b"hello", "notes.txt"));
        assert!(matches!(
            result,
            Err(ExtractionError::UnsupportedType { filename }) if filename == "notes.txt"
        ));
    }

    #[test]
    fn pdf_pages_joined_and_lowercased() {
        let bytes = pdf_with_pages(&["Invoice Number: 1001", "Amount Due: $50"]);
        let ex = extractor(StubOcr::default());
        let text = ex.extract(&Document::new(&bytes, "bill.pdf")).unwrap();
        let text = text.as_text().unwrap();
        assert!(text.contains("invoice number: 1001"), "got {text:?}");
        assert!(text.contains("amount due: $50"), "got {text:?}");
        assert_eq!(text, text.to_lowercase());
    }

    #[test]
    fn corrupt_pdf_errors() {
        let ex = extractor(StubOcr::default());
        let result = ex.extract(&Document::new(b"%PDF-garbage", "broken.pdf"));
        assert!(matches!(result, Err(ExtractionError::Pdf(_))));
    }

    #[test]
    fn image_goes_through_ocr_in_grayscale() {
        let ocr = StubOcr::returning("  DRIVER LICENSE\nDOB 01/02/1990 ");
        let seen = ocr.seen.clone();
        let ex = extractor(ocr);

        let text = ex.extract(&Document::new(&png_bytes(), "id.png")).unwrap();
        assert_eq!(
            text,
            ExtractedText::Text("driver license\ndob 01/02/1990".into())
        );
        assert_eq!(seen.lock().unwrap().as_slice(), &[(8, 6)]);
    }

    #[test]
    fn whitespace_ocr_is_no_text() {
        let ex = extractor(StubOcr::returning(" \n\x0c"));
        let text = ex.extract(&Document::new(&png_bytes(), "blank.png")).unwrap();
        assert_eq!(text, ExtractedText::NoText);
    }

    #[test]
    fn undecodable_image_errors() {
        let ex = extractor(StubOcr::default());
        let result = ex.extract(&Document::new(b"not an image", "drivers_license_scan.jpg"));
        assert!(matches!(result, Err(ExtractionError::Image(_))));
    }

    #[test]
    fn ocr_failure_errors() {
        let ex = extractor(FailingOcr);
        let result = ex.extract(&Document::new(&png_bytes(), "scan.png"));
        assert!(matches!(result, Err(ExtractionError::Ocr(_))));
    }

    #[test]
    fn input_bytes_left_untouched() {
        let bytes = png_bytes();
        let copy = bytes.clone();
        let ex = extractor(StubOcr::returning("text"));
        let doc = Document::new(&bytes, "scan.png");
        ex.extract(&doc).unwrap();
        ex.extract(&doc).unwrap();
        assert_eq!(doc.bytes, copy.as_slice());
    }
}
