//! The fallback cascade.
//!
//! ```text
//! Extracting ─▶ StatisticalPredicting ─▶ KeywordScoring ─▶ FilenameFallback ─▶ Done
//!     └─────────────── extraction error ──────────────────────▲
//! ```
//!
//! A stage that answers ends the cascade; one that abstains or fails hands
//! over to the next. Failures and abstentions are recorded as [`Cause`]s
//! and surface in the result's `debug_info`. The cascade itself cannot fail.

use std::collections::BTreeMap;
use std::sync::Arc;

use doctriage_ai::{classify_by_filename, score_all};
use doctriage_core::{
    CategoryId, Cause, ClassificationResult, DebugInfo, Document, DocumentLabel, ExtractedText,
    Method, Stage, round2,
};
use tracing::{info, warn};

use crate::ClassifierContext;

/// Characters of extracted text kept in `debug_info`.
pub const TEXT_SAMPLE_CHARS: usize = 100;

pub const MSG_STATISTICAL: &str = "Classified by ML model.";
pub const MSG_KEYWORDS: &str = "Classified by OCR/keywords.";

/// Runs the cascade against a shared [`ClassifierContext`].
#[derive(Clone)]
pub struct Orchestrator {
    context: Arc<ClassifierContext>,
}

/// State accumulated while a document moves through the cascade.
#[derive(Default)]
struct Trace {
    sample: String,
    scores: BTreeMap<CategoryId, f64>,
    causes: Vec<Cause>,
}

impl Trace {
    fn record(&mut self, stage: Stage, reason: impl Into<String>) {
        let cause = Cause::new(stage, reason);
        warn!(stage = %cause.stage, reason = %cause.reason, "stage did not classify");
        self.causes.push(cause);
    }

    fn reasons(&self) -> String {
        self.causes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn finish(
        self,
        method: Method,
        label: DocumentLabel,
        confidence: f64,
        matched_keywords: Vec<String>,
        message: String,
    ) -> ClassificationResult {
        ClassificationResult {
            label,
            confidence,
            matched_keywords,
            message,
            debug_info: Some(DebugInfo {
                method,
                extracted_text_sample: self.sample,
                scores: self.scores,
                causes: self.causes,
            }),
        }
    }
}

impl Orchestrator {
    pub fn new(context: Arc<ClassifierContext>) -> Self {
        Self { context }
    }

    /// Classify one document.
    ///
    /// Always returns a well-formed result; stage failures end up in
    /// `debug_info.causes` and in the message of fallback results.
    pub fn classify(&self, document: &Document<'_>) -> ClassificationResult {
        let mut trace = Trace::default();

        let result = match self.context.extractor.extract(document) {
            Ok(text) => {
                trace.sample = text.sample(TEXT_SAMPLE_CHARS);
                self.classify_text(document, &text, trace)
            }
            Err(e) => {
                trace.record(Stage::Extraction, e.to_string());
                self.filename_fallback(document, trace)
            }
        };

        info!(
            filename = document.filename,
            label = %result.label,
            confidence = result.confidence,
            "classified"
        );
        result
    }

    fn classify_text(
        &self,
        document: &Document<'_>,
        text: &ExtractedText,
        mut trace: Trace,
    ) -> ClassificationResult {
        let ctx = &self.context;

        match ctx.statistical.predict(text) {
            Ok(Some(prediction)) => {
                return trace.finish(
                    Method::Statistical,
                    prediction.category.into(),
                    prediction.confidence,
                    Vec::new(),
                    MSG_STATISTICAL.to_string(),
                );
            }
            Ok(None) => {}
            Err(e) => trace.record(Stage::Statistical, e.to_string()),
        }

        let vector = score_all(text, &ctx.signatures);
        trace.scores = vector.scores();
        if text.is_no_text() {
            trace.record(Stage::Keywords, "no text extracted");
            return self.filename_fallback(document, trace);
        }

        match vector.best() {
            Some((category, best)) if best.score >= ctx.thresholds.keyword => {
                let matched = best.matched.clone();
                // The raw score can exceed 1 when partial matches stack on exact ones.
                let confidence = round2(best.score).min(1.0);
                trace.finish(
                    Method::Keywords,
                    category.into(),
                    confidence,
                    matched,
                    MSG_KEYWORDS.to_string(),
                )
            }
            Some((category, best)) => {
                trace.record(
                    Stage::Keywords,
                    format!(
                        "low confidence: best score {:.2} for {category} is below {}",
                        best.score, ctx.thresholds.keyword
                    ),
                );
                self.filename_fallback(document, trace)
            }
            None => {
                trace.record(Stage::Keywords, "no signatures to score against");
                self.filename_fallback(document, trace)
            }
        }
    }

    fn filename_fallback(&self, document: &Document<'_>, mut trace: Trace) -> ClassificationResult {
        match classify_by_filename(document.filename, &self.context.signatures) {
            Ok(found) => {
                let label = DocumentLabel::from(found);
                let message = match found {
                    Some(_) => format!("Classified by filename fallback ({}).", trace.reasons()),
                    None => format!(
                        "Could not classify document; filename fallback found no match ({}).",
                        trace.reasons()
                    ),
                };
                trace.finish(Method::Filename, label, 0.0, Vec::new(), message)
            }
            Err(e) => {
                trace.record(Stage::Filename, e.to_string());
                let message = format!("Classification failed: {}.", trace.reasons());
                trace.finish(Method::None, DocumentLabel::Unknown, 0.0, Vec::new(), message)
            }
        }
    }
}
