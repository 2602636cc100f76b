//! Classification strategies: statistical model, keyword scoring, filename heuristic.

mod filename;
mod keywords;
mod model;
mod statistical;

pub use filename::{FilenameError, classify_by_filename};
pub use keywords::{KeywordScore, ScoreVector, score, score_all};
pub use model::{MODEL_FORMAT_VERSION, ModelError, TextClassifier, TfidfLogisticModel};
pub use statistical::{ModelUnavailable, Prediction, StatisticalAdapter, adapter_for};
