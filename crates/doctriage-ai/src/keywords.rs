//! Deterministic keyword scoring against category signatures.
//!
//! For a text and a signature with keywords `K`:
//!
//! - `exact` counts keywords that occur as a substring of the text,
//! - `partial` counts keywords that contain at least one whitespace-delimited
//!   token of the text (catches fragmentary OCR tokens),
//! - `score = (exact * 1.0 + partial * 0.5) / |K|`.
//!
//! The score is not clamped; acceptance thresholds are tuned against this
//! exact formula. A `NoText` extraction always scores 0.0.

use std::collections::BTreeMap;

use doctriage_core::{CategoryId, CategorySignature, ExtractedText, SignatureSet};
use tracing::debug;

const EXACT_WEIGHT: f64 = 1.0;
const PARTIAL_WEIGHT: f64 = 0.5;

/// Score of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordScore {
    pub score: f64,
    /// Keywords found verbatim in the text, in signature order.
    pub matched: Vec<String>,
}

impl KeywordScore {
    fn zero() -> Self {
        Self {
            score: 0.0,
            matched: Vec::new(),
        }
    }
}

/// Score `text` against a single signature.
pub fn score(text: &ExtractedText, signature: &CategorySignature) -> KeywordScore {
    let Some(text) = text.as_text() else {
        return KeywordScore::zero();
    };
    if signature.keywords.is_empty() {
        return KeywordScore::zero();
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();

    let matched: Vec<String> = signature
        .keywords
        .iter()
        .filter(|kw| text.contains(kw.as_str()))
        .cloned()
        .collect();
    let partial = signature
        .keywords
        .iter()
        .filter(|kw| tokens.iter().any(|token| kw.contains(token)))
        .count();

    let exact = matched.len();
    let score = (exact as f64 * EXACT_WEIGHT + partial as f64 * PARTIAL_WEIGHT)
        / signature.keywords.len() as f64;

    KeywordScore { score, matched }
}

/// Per-category keyword scores for one text, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    entries: Vec<(CategoryId, KeywordScore)>,
}

/// Score `text` against every signature in the set.
pub fn score_all(text: &ExtractedText, signatures: &SignatureSet) -> ScoreVector {
    let entries = signatures
        .iter()
        .map(|sig| {
            let s = score(text, sig);
            debug!(category = %sig.id, score = s.score, matched = ?s.matched, "keyword score");
            (sig.id, s)
        })
        .collect();
    ScoreVector { entries }
}

impl ScoreVector {
    /// Highest-scoring category.
    ///
    /// Ties go to the category declared first: a later category must score
    /// strictly higher to displace an earlier one.
    pub fn best(&self) -> Option<(CategoryId, &KeywordScore)> {
        let mut best: Option<(CategoryId, &KeywordScore)> = None;
        for (id, s) in &self.entries {
            match best {
                Some((_, current)) if s.score <= current.score => {}
                _ => best = Some((*id, s)),
            }
        }
        best
    }

    pub fn get(&self, id: CategoryId) -> Option<&KeywordScore> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &KeywordScore)> {
        self.entries.iter().map(|(id, s)| (*id, s))
    }

    /// Scores only, keyed by category.
    pub fn scores(&self) -> BTreeMap<CategoryId, f64> {
        self.entries.iter().map(|(id, s)| (*id, s.score)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_MARKERS: [&str; 0] = [];

    fn text(s: &str) -> ExtractedText {
        ExtractedText::normalize(s)
    }

    fn invoice_signature() -> CategorySignature {
        SignatureSet::builtin()
            .get(CategoryId::Invoice)
            .unwrap()
            .clone()
    }

    #[test]
    fn no_text_scores_zero_everywhere() {
        let vector = score_all(&ExtractedText::NoText, &SignatureSet::builtin());
        for (id, s) in vector.iter() {
            assert_eq!(s.score, 0.0, "{id} should score zero");
            assert!(s.matched.is_empty());
        }
    }

    #[test]
    fn invoice_phrase_matches_at_least_three_exact() {
        let s = score(&text("invoice bill to total"), &invoice_signature());
        assert!(s.matched.len() >= 3, "matched {:?}", s.matched);
        assert_eq!(s.matched, vec!["invoice", "bill to", "total"]);
    }

    #[test]
    fn formula_on_literal_input() {
        // exact: invoice, bill to, total (3)
        // partial: invoice, bill to, total, subtotal, invoice number (5)
        let s = score(&text("invoice bill to total"), &invoice_signature());
        let expected = (3.0 * 1.0 + 5.0 * 0.5) / 11.0;
        assert!((s.score - expected).abs() < 1e-12, "got {}", s.score);
    }

    #[test]
    fn partial_tokens_count_toward_score() {
        // "amo" is contained in "amount due"; no keyword occurs in the text.
        let sig =
            CategorySignature::new(CategoryId::Invoice, ["amount due", "payment"], NO_MARKERS);
        let s = score(&text("amo"), &sig);
        assert!(s.matched.is_empty());
        assert_eq!(s.score, 0.5 / 2.0);
    }

    #[test]
    fn score_is_not_clamped() {
        // Every keyword matches both ways: (1 + 0.5) / 1.
        let sig = CategorySignature::new(CategoryId::Invoice, ["tax"], NO_MARKERS);
        let s = score(&text("tax"), &sig);
        assert_eq!(s.score, 1.5);
    }

    #[test]
    fn matched_keeps_signature_order() {
        let s = score(&text("total due date invoice"), &invoice_signature());
        assert_eq!(s.matched, vec!["invoice", "total", "due date"]);
    }

    #[test]
    fn best_breaks_ties_by_declaration_order() {
        let set = SignatureSet::new(vec![
            CategorySignature::new(CategoryId::BankStatement, ["balance"], NO_MARKERS),
            CategorySignature::new(CategoryId::DriversLicence, ["balance"], NO_MARKERS),
        ])
        .unwrap();
        let vector = score_all(&text("balance"), &set);

        let a = vector.get(CategoryId::DriversLicence).unwrap().score;
        let b = vector.get(CategoryId::BankStatement).unwrap().score;
        assert_eq!(a, b);
        assert!(a > 0.0);

        let (winner, _) = vector.best().unwrap();
        assert_eq!(winner, CategoryId::DriversLicence);
    }

    #[test]
    fn best_prefers_strictly_higher_later_category() {
        let vector = score_all(&text("invoice number 1001 amount due"), &SignatureSet::builtin());
        let (winner, best) = vector.best().unwrap();
        assert_eq!(winner, CategoryId::Invoice);
        assert!(best.matched.contains(&"amount due".to_string()));
    }

    #[test]
    fn scores_map_covers_every_category() {
        let vector = score_all(&text("bank balance"), &SignatureSet::builtin());
        let scores = vector.scores();
        assert_eq!(scores.len(), 3);
        assert!(scores[&CategoryId::BankStatement] > scores[&CategoryId::Invoice]);
    }

    #[test]
    fn scoring_is_deterministic() {
        let t = text("Statement of account, ending balance 100.00");
        let set = SignatureSet::builtin();
        assert_eq!(score_all(&t, &set), score_all(&t, &set));
    }
}
