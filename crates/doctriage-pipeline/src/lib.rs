//! Document classification pipeline: extraction followed by the
//! statistical → keyword → filename fallback cascade.

mod context;
mod orchestrator;

pub use context::{ClassifierContext, ContextError};
pub use orchestrator::{MSG_KEYWORDS, MSG_STATISTICAL, Orchestrator, TEXT_SAMPLE_CHARS};
