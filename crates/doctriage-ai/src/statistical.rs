//! Statistical classifier adapter.
//!
//! Wraps a [`TextClassifier`] behind a lazy, load-once handle and turns its
//! probabilities into a typed outcome: a confident category, an abstention,
//! or [`ModelUnavailable`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use doctriage_core::{CategoryId, ExtractedText};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{ModelError, TextClassifier, TfidfLogisticModel, argmax};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelUnavailable {
    #[error("statistical model disabled")]
    Disabled,

    #[error("failed to load model: {0}")]
    Load(String),

    #[error("model prediction failed: {0}")]
    Predict(String),

    #[error("model predicted unknown label {0:?}")]
    UnknownLabel(String),
}

/// A confident statistical answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub category: CategoryId,
    /// Probability of the predicted class.
    pub confidence: f64,
}

type Loader = Box<dyn Fn() -> Result<Arc<dyn TextClassifier>, ModelError> + Send + Sync>;

/// Load-once handle on the trained model.
///
/// The first [`predict`](Self::predict) call runs the loader; concurrent
/// callers block until it finishes and then share the outcome. A failed load
/// is kept and reported on every later call.
pub struct StatisticalAdapter {
    loader: Option<Loader>,
    model: OnceLock<Result<Arc<dyn TextClassifier>, String>>,
    threshold: f64,
}

impl std::fmt::Debug for StatisticalAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticalAdapter")
            .field("enabled", &self.loader.is_some())
            .field("loaded", &self.model.get().is_some())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl StatisticalAdapter {
    /// Lazily load a [`TfidfLogisticModel`] artifact from `path`.
    pub fn from_path(path: impl Into<PathBuf>, threshold: f64) -> Self {
        let path = path.into();
        Self::with_loader(
            move || {
                let model = TfidfLogisticModel::load(&path)?;
                Ok(Arc::new(model) as Arc<dyn TextClassifier>)
            },
            threshold,
        )
    }

    /// Lazily build the classifier with a custom loader.
    pub fn with_loader<F>(loader: F, threshold: f64) -> Self
    where
        F: Fn() -> Result<Arc<dyn TextClassifier>, ModelError> + Send + Sync + 'static,
    {
        Self {
            loader: Some(Box::new(loader)),
            model: OnceLock::new(),
            threshold,
        }
    }

    /// Use an already-built classifier.
    pub fn with_classifier(classifier: Arc<dyn TextClassifier>, threshold: f64) -> Self {
        let model = OnceLock::new();
        let _ = model.set(Ok(classifier));
        Self {
            loader: None,
            model,
            threshold,
        }
    }

    /// No model configured; every prediction reports [`ModelUnavailable::Disabled`].
    pub fn disabled() -> Self {
        Self {
            loader: None,
            model: OnceLock::new(),
            threshold: 1.0,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn classifier(&self) -> Result<&Arc<dyn TextClassifier>, ModelUnavailable> {
        let outcome = match (&self.loader, self.model.get()) {
            (_, Some(outcome)) => outcome,
            (None, None) => return Err(ModelUnavailable::Disabled),
            (Some(loader), None) => self.model.get_or_init(|| match loader() {
                Ok(model) => {
                    info!(classes = ?model.classes(), "statistical model ready");
                    Ok(model)
                }
                Err(e) => {
                    warn!(error = %e, "statistical model failed to load");
                    Err(e.to_string())
                }
            }),
        };
        outcome
            .as_ref()
            .map_err(|reason| ModelUnavailable::Load(reason.clone()))
    }

    /// Predict a category for `text`.
    ///
    /// `Ok(None)` means the adapter abstains: the text is empty or the best
    /// probability does not exceed the threshold.
    pub fn predict(&self, text: &ExtractedText) -> Result<Option<Prediction>, ModelUnavailable> {
        let Some(text) = text.as_text() else {
            debug!("no text, statistical stage abstains");
            return Ok(None);
        };

        let model = self.classifier()?;
        let probs = model
            .predict_proba(text)
            .map_err(|e| ModelUnavailable::Predict(e.to_string()))?;
        if let Some(p) = probs.iter().find(|p| !p.is_finite()) {
            return Err(ModelUnavailable::Predict(format!("non-finite probability {p}")));
        }
        let (idx, confidence) = argmax(&probs)
            .ok_or_else(|| ModelUnavailable::Predict("empty probability vector".into()))?;

        if confidence <= self.threshold {
            debug!(confidence, threshold = self.threshold, "statistical confidence too low");
            return Ok(None);
        }

        let label = model
            .classes()
            .get(idx)
            .ok_or_else(|| ModelUnavailable::Predict(format!("no class at index {idx}")))?;
        let category: CategoryId = label
            .parse()
            .map_err(|_| ModelUnavailable::UnknownLabel(label.clone()))?;

        info!(category = %category, confidence, "statistical prediction");
        Ok(Some(Prediction {
            category,
            confidence,
        }))
    }
}

/// Adapter for an optional artifact path; `None` disables the stage.
pub fn adapter_for(path: Option<&Path>, threshold: f64) -> StatisticalAdapter {
    match path {
        Some(path) => StatisticalAdapter::from_path(path, threshold),
        None => StatisticalAdapter::disabled(),
    }
}
