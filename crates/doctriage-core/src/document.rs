//! Input documents and the text extracted from them.

/// An uploaded document, borrowed for the duration of one classification.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    pub bytes: &'a [u8],
    pub filename: &'a str,
}

impl<'a> Document<'a> {
    pub fn new(bytes: &'a [u8], filename: &'a str) -> Self {
        Self { bytes, filename }
    }

    /// Lowercased extension after the last `.`, if any.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Normalised text content of a document.
///
/// `NoText` means extraction worked mechanically but found nothing usable,
/// e.g. a blank scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedText {
    Text(String),
    NoText,
}

impl ExtractedText {
    /// Trim and lowercase raw extractor output; whitespace-only input
    /// becomes [`ExtractedText::NoText`].
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::NoText
        } else {
            Self::Text(trimmed.to_lowercase())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::NoText => None,
        }
    }

    pub fn is_no_text(&self) -> bool {
        matches!(self, Self::NoText)
    }

    /// First `max_chars` characters, for diagnostics.
    pub fn sample(&self, max_chars: usize) -> String {
        match self {
            Self::Text(s) => s.chars().take(max_chars).collect(),
            Self::NoText => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(Document::new(b"", "Scan.JPEG").extension().as_deref(), Some("jpeg"));
        assert_eq!(Document::new(b"", "a.b.pdf").extension().as_deref(), Some("pdf"));
    }

    #[test]
    fn extension_missing() {
        assert_eq!(Document::new(b"", "README").extension(), None);
        assert_eq!(Document::new(b"", "trailing.").extension(), None);
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(
            ExtractedText::normalize("  Invoice TOTAL \n"),
            ExtractedText::Text("invoice total".into())
        );
    }

    #[test]
    fn normalize_whitespace_is_no_text() {
        assert_eq!(ExtractedText::normalize(" \n\t "), ExtractedText::NoText);
        assert_eq!(ExtractedText::normalize(""), ExtractedText::NoText);
    }

    #[test]
    fn sample_counts_chars_not_bytes() {
        let text = ExtractedText::Text("ééééé".into());
        assert_eq!(text.sample(3), "ééé");
        assert_eq!(ExtractedText::NoText.sample(3), "");
    }
}
