//! The externally observable outcome of one classification.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CategoryId, DocumentLabel};

/// Pipeline stage that produced a cause entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extraction,
    Statistical,
    Keywords,
    Filename,
    Caller,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Statistical => "statistical",
            Self::Keywords => "keywords",
            Self::Filename => "filename",
            Self::Caller => "caller",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stage failed or abstained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cause {
    pub stage: Stage,
    pub reason: String,
}

impl Cause {
    pub fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.reason)
    }
}

/// Strategy that decided the final label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Statistical,
    Keywords,
    Filename,
    None,
}

/// Diagnostic detail attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    pub method: Method,
    /// Leading characters of the extracted text (empty when nothing was extracted).
    pub extracted_text_sample: String,
    /// Keyword score per category; empty when keyword scoring did not run.
    pub scores: BTreeMap<CategoryId, f64>,
    /// Failures and abstentions, in the order they happened.
    pub causes: Vec<Cause>,
}

/// Final classification of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub label: DocumentLabel,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl ClassificationResult {
    /// A zero-confidence `error` result for failures outside the cascade.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            label: DocumentLabel::Error,
            confidence: 0.0,
            matched_keywords: Vec::new(),
            debug_info: Some(DebugInfo {
                method: Method::None,
                extracted_text_sample: String::new(),
                scores: BTreeMap::new(),
                causes: vec![Cause::new(Stage::Caller, message.clone())],
            }),
            message,
        }
    }

    pub fn causes(&self) -> &[Cause] {
        self.debug_info
            .as_ref()
            .map(|d| d.causes.as_slice())
            .unwrap_or_default()
    }
}

/// Round to two decimal places, the precision reported for keyword scores.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
