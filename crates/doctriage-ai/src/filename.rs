//! Last-resort classification from filename substrings.

use doctriage_core::{CategoryId, SignatureSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilenameError {
    #[error("filename is blank")]
    Blank,
}

/// Infer a category from markers in the filename.
///
/// Markers are checked per signature in declaration order (driver's
/// licence, then bank statement, then invoice); the first hit wins.
/// `Ok(None)` means no marker matched.
pub fn classify_by_filename(
    filename: &str,
    signatures: &SignatureSet,
) -> Result<Option<CategoryId>, FilenameError> {
    if filename.trim().is_empty() {
        return Err(FilenameError::Blank);
    }

    let lowered = filename.to_lowercase();
    let hit = signatures.iter().find(|sig| {
        sig.filename_markers
            .iter()
            .any(|marker| lowered.contains(marker.as_str()))
    });
    Ok(hit.map(|sig| sig.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctriage_core::CategorySignature;

    fn builtin(filename: &str) -> Result<Option<CategoryId>, FilenameError> {
        classify_by_filename(filename, &SignatureSet::builtin())
    }

    #[test]
    fn recognises_each_category() {
        assert_eq!(
            builtin("drivers_license_scan.jpg"),
            Ok(Some(CategoryId::DriversLicence))
        );
        assert_eq!(
            builtin("Bank_Statement_March.pdf"),
            Ok(Some(CategoryId::BankStatement))
        );
        assert_eq!(builtin("INVOICE-2024-001.png"), Ok(Some(CategoryId::Invoice)));
    }

    #[test]
    fn british_spelling_marker() {
        assert_eq!(
            builtin("my_driving_licence.png"),
            Ok(Some(CategoryId::DriversLicence))
        );
    }

    #[test]
    fn unknown_when_nothing_matches() {
        assert_eq!(builtin("random_file.pdf"), Ok(None));
    }

    #[test]
    fn priority_order_first_match_wins() {
        assert_eq!(
            builtin("invoice_for_bank_statement_and_drivers_license.pdf"),
            Ok(Some(CategoryId::DriversLicence))
        );
        assert_eq!(
            builtin("invoice_bank_statement.pdf"),
            Ok(Some(CategoryId::BankStatement))
        );
    }

    #[test]
    fn blank_filename_errors() {
        assert_eq!(builtin(""), Err(FilenameError::Blank));
        assert_eq!(builtin("   "), Err(FilenameError::Blank));
    }

    #[test]
    fn custom_markers() {
        let set = SignatureSet::new(vec![CategorySignature::new(
            CategoryId::Invoice,
            ["invoice"],
            ["rechnung"],
        )])
        .unwrap();
        assert_eq!(
            classify_by_filename("Rechnung_42.pdf", &set),
            Ok(Some(CategoryId::Invoice))
        );
        assert_eq!(classify_by_filename("invoice.pdf", &set), Ok(None));
    }
}
