//! Trained text classifier artifact: TF-IDF features into logistic regression.
//!
//! The artifact is a JSON export of a fitted TF-IDF vectorizer and logistic
//! regression head. Everything needed to reproduce `predict_proba` lives in
//! the file; nothing is learned or mutated at serving time.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "classes": ["bank_statement", "drivers_licence", "invoice"],
//!   "vocabulary": { "invoice": 0, "balance": 1 },
//!   "idf": [1.4, 1.7],
//!   "coef": [[-0.2, 2.1], [-0.4, -0.9], [2.3, -0.8]],
//!   "intercept": [0.01, -0.02, 0.01]
//! }
//! ```
//!
//! Binary models may carry a single coefficient row (the positive class is
//! `classes[1]`), matching how logistic regression stores two-class fits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub const MODEL_FORMAT_VERSION: u32 = 1;

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported model format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("invalid token pattern: {0}")]
    TokenPattern(#[from] regex::Error),

    #[error("model shape mismatch: {0}")]
    Shape(String),

    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// A loaded text classifier exposing class probabilities.
///
/// Implementations are read-only after construction and shared across threads.
pub trait TextClassifier: Send + Sync {
    /// Class labels, index-aligned with [`predict_proba`](Self::predict_proba).
    fn classes(&self) -> &[String];

    /// Probability per class, summing to 1.
    fn predict_proba(&self, text: &str) -> Result<Vec<f64>, ModelError>;

    /// Most probable class label.
    fn predict(&self, text: &str) -> Result<String, ModelError> {
        let probs = self.predict_proba(text)?;
        let (idx, _) = argmax(&probs)
            .ok_or_else(|| ModelError::Prediction("empty probability vector".into()))?;
        self.classes()
            .get(idx)
            .cloned()
            .ok_or_else(|| ModelError::Prediction(format!("no class at index {idx}")))
    }
}

/// Index and value of the largest element; the first one wins ties.
pub(crate) fn argmax(values: &[f64]) -> Option<(usize, f64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Norm {
    #[default]
    L2,
    None,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Artifact {
    format_version: u32,
    classes: Vec<String>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    norm: Norm,
    #[serde(default)]
    token_pattern: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Head {
    /// One coefficient row; sigmoid gives P(classes[1]).
    Binary,
    /// One row per class; softmax over decision values.
    Multinomial,
}

/// TF-IDF vectorizer followed by a logistic regression head.
#[derive(Debug)]
pub struct TfidfLogisticModel {
    classes: Vec<String>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    lowercase: bool,
    sublinear_tf: bool,
    norm: Norm,
    token_pattern: Regex,
    head: Head,
}

impl TfidfLogisticModel {
    /// Parse and validate a JSON artifact.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: Artifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    /// Read, parse, and validate an artifact from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            classes = model.classes.len(),
            features = model.idf.len(),
            "loaded statistical model"
        );
        Ok(model)
    }

    fn from_artifact(a: Artifact) -> Result<Self, ModelError> {
        if a.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelError::Version {
                found: a.format_version,
                expected: MODEL_FORMAT_VERSION,
            });
        }
        if a.classes.len() < 2 {
            return Err(ModelError::Shape(format!(
                "need at least 2 classes, found {}",
                a.classes.len()
            )));
        }

        let n_features = a.idf.len();
        if let Some((term, &idx)) = a.vocabulary.iter().find(|(_, idx)| **idx >= n_features) {
            return Err(ModelError::Shape(format!(
                "vocabulary term {term:?} maps to column {idx} but idf has {n_features} entries"
            )));
        }

        let head = if a.classes.len() == 2 && a.coef.len() == 1 {
            Head::Binary
        } else if a.coef.len() == a.classes.len() {
            Head::Multinomial
        } else {
            return Err(ModelError::Shape(format!(
                "{} coefficient rows for {} classes",
                a.coef.len(),
                a.classes.len()
            )));
        };
        if a.intercept.len() != a.coef.len() {
            return Err(ModelError::Shape(format!(
                "{} intercepts for {} coefficient rows",
                a.intercept.len(),
                a.coef.len()
            )));
        }
        if let Some(row) = a.coef.iter().position(|row| row.len() != n_features) {
            return Err(ModelError::Shape(format!(
                "coefficient row {row} has {} columns, expected {n_features}",
                a.coef[row].len()
            )));
        }

        let token_pattern =
            Regex::new(a.token_pattern.as_deref().unwrap_or(DEFAULT_TOKEN_PATTERN))?;

        Ok(Self {
            classes: a.classes,
            vocabulary: a.vocabulary,
            idf: a.idf,
            coef: a.coef,
            intercept: a.intercept,
            lowercase: a.lowercase,
            sublinear_tf: a.sublinear_tf,
            norm: a.norm,
            token_pattern,
            head,
        })
    }

    /// Sparse TF-IDF features: `(column, weight)` sorted by column.
    fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let lowered;
        let text = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in self.token_pattern.find_iter(text) {
            if let Some(&col) = self.vocabulary.get(token.as_str()) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut features: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, count)| {
                let tf = if self.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                (col, tf * self.idf[col])
            })
            .collect();
        features.sort_by_key(|(col, _)| *col);

        if self.norm == Norm::L2 {
            let norm = features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, v) in &mut features {
                    *v /= norm;
                }
            }
        }
        features
    }

    fn decision(&self, features: &[(usize, f64)]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| b + features.iter().map(|(col, v)| row[*col] * v).sum::<f64>())
            .collect()
    }
}

impl TextClassifier for TfidfLogisticModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, text: &str) -> Result<Vec<f64>, ModelError> {
        let features = self.transform(text);
        let decision = self.decision(&features);
        Ok(match self.head {
            Head::Binary => {
                let p = sigmoid(decision[0]);
                vec![1.0 - p, p]
            }
            Head::Multinomial => softmax(&decision),
        })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
