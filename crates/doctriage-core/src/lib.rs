//! Core types, category signatures, and shared configuration.

pub mod category;
pub mod config;
pub mod document;
pub mod result;
pub mod signature;

pub use category::{CategoryId, DocumentLabel, ParseLabelError};
pub use config::{ConfigError, OcrConfig, PipelineConfig, Thresholds};
pub use document::{Document, ExtractedText};
pub use result::{Cause, ClassificationResult, DebugInfo, Method, Stage, round2};
pub use signature::{CategorySignature, SignatureError, SignatureSet};
