//! Pipeline configuration, read once at startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default location of the trained model artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/model.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{name} threshold must lie in [0, 1], got {value}")]
    ThresholdRange { name: &'static str, value: f64 },
}

/// Acceptance thresholds per stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// The statistical answer is accepted when its probability is strictly above this.
    pub statistical: f64,
    /// The keyword answer is accepted when its score is at least this.
    pub keyword: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            statistical: 0.3,
            keyword: 0.1,
        }
    }
}

impl Thresholds {
    pub fn validate(self) -> Result<Self, ConfigError> {
        for (name, value) in [("statistical", self.statistical), ("keyword", self.keyword)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdRange { name, value });
            }
        }
        Ok(self)
    }
}

/// Tesseract invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OcrConfig {
    pub binary: PathBuf,
    pub language: String,
    /// OCR engine mode (`--oem`).
    pub oem: u8,
    /// Page segmentation mode (`--psm`); 6 assumes a single uniform block of text.
    pub psm: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            oem: 3,
            psm: 6,
        }
    }
}

/// Everything needed to build a classifier context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Trained model artifact; the statistical stage is disabled when `None`.
    pub model_path: Option<PathBuf>,
    /// Signature table; the built-in table is used when `None`.
    pub signatures_path: Option<PathBuf>,
    pub thresholds: Thresholds,
    pub ocr: OcrConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: Some(PathBuf::from(DEFAULT_MODEL_PATH)),
            signatures_path: None,
            thresholds: Thresholds::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        self.thresholds.validate()?;
        Ok(self)
    }
}
