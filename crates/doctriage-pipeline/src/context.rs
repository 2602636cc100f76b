//! Everything a classification needs, built once at startup.

use doctriage_ai::{StatisticalAdapter, adapter_for};
use doctriage_core::{PipelineConfig, SignatureError, SignatureSet, Thresholds};
use doctriage_extract::TextExtractor;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("signature table: {0}")]
    Signatures(#[from] SignatureError),
}

/// Read-only state shared by every classification.
///
/// Build one per process and share it behind an `Arc`; nothing in here is
/// mutated after construction apart from the statistical model's load-once
/// cell.
pub struct ClassifierContext {
    pub signatures: SignatureSet,
    pub extractor: TextExtractor,
    pub statistical: StatisticalAdapter,
    pub thresholds: Thresholds,
}

impl ClassifierContext {
    pub fn new(
        signatures: SignatureSet,
        extractor: TextExtractor,
        statistical: StatisticalAdapter,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            signatures,
            extractor,
            statistical,
            thresholds,
        }
    }

    /// Wire up the default engines from configuration.
    ///
    /// The signature table is read eagerly; the model artifact is only read
    /// on the first prediction.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ContextError> {
        let signatures = match &config.signatures_path {
            Some(path) => SignatureSet::load(path)?,
            None => SignatureSet::builtin(),
        };
        let statistical =
            adapter_for(config.model_path.as_deref(), config.thresholds.statistical);

        info!(
            categories = signatures.len(),
            model = ?config.model_path,
            statistical_threshold = config.thresholds.statistical,
            keyword_threshold = config.thresholds.keyword,
            "classifier context ready"
        );

        Ok(Self::new(
            signatures,
            TextExtractor::with_tesseract(config.ocr.clone()),
            statistical,
            config.thresholds,
        ))
    }
}
