//! Concurrent classification of a batch of files.
//!
//! Each file is read, then classified on tokio's blocking pool under a
//! time limit. A timeout or a panic inside the pipeline produces an
//! `error` result for that file only. Work that overruns its limit is
//! abandoned when the batch runtime shuts down, not joined.

use std::path::{Path, PathBuf};
use std::time::Duration;

use doctriage_core::{ClassificationResult, DebugInfo, Document};
use doctriage_extract::{SUPPORTED_EXTENSIONS, is_supported};
use doctriage_pipeline::Orchestrator;
use serde::Serialize;
use tracing::{error, warn};

/// One line of output, in the shape of the classification endpoint's response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub classification: String,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl FileReport {
    pub fn new(filename: String, result: ClassificationResult, with_debug: bool) -> Self {
        Self {
            filename,
            classification: result.label.to_string(),
            confidence: result.confidence,
            matched_keywords: result.matched_keywords,
            message: result.message,
            debug_info: if with_debug { result.debug_info } else { None },
        }
    }
}

/// Name the document is classified under: the final path component.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Classify a single file.
pub async fn classify_file(
    orchestrator: Orchestrator,
    path: PathBuf,
    timeout: Duration,
) -> (String, ClassificationResult) {
    let filename = display_name(&path);

    if !is_supported(&filename) {
        warn!(file = %path.display(), "unsupported file type");
        let message = format!("Allowed file types are: {}", SUPPORTED_EXTENSIONS.join(", "));
        return (filename, ClassificationResult::error(message));
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(file = %path.display(), error = %e, "failed to read file");
            return (
                filename,
                ClassificationResult::error(format!("failed to read {}: {e}", path.display())),
            );
        }
    };

    let name = filename.clone();
    let task = tokio::task::spawn_blocking(move || {
        orchestrator.classify(&Document::new(&bytes, &name))
    });

    let result = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            error!(file = %path.display(), error = %e, "classification task failed");
            ClassificationResult::error(format!("classification task failed: {e}"))
        }
        Err(_) => {
            error!(
                file = %path.display(),
                timeout_secs = timeout.as_secs_f64(),
                "classification timed out"
            );
            ClassificationResult::error(format!(
                "classification timed out after {:.1}s",
                timeout.as_secs_f64()
            ))
        }
    };
    (filename, result)
}

/// Classify every file concurrently; reports come back in input order.
pub async fn classify_all(
    orchestrator: &Orchestrator,
    paths: &[PathBuf],
    timeout: Duration,
    with_debug: bool,
) -> Vec<FileReport> {
    let handles: Vec<_> = paths
        .iter()
        .map(|path| tokio::spawn(classify_file(orchestrator.clone(), path.clone(), timeout)))
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (path, handle) in paths.iter().zip(handles) {
        let (filename, result) = match handle.await {
            Ok(pair) => pair,
            Err(e) => (
                display_name(path),
                ClassificationResult::error(format!("classification task failed: {e}")),
            ),
        };
        reports.push(FileReport::new(filename, result, with_debug));
    }
    reports
}

/// Run [`classify_all`] on a runtime of its own.
///
/// The runtime is shut down in the background once every report is in, so
/// a blocking task stuck past its deadline cannot hold up the caller.
pub fn run_batch(
    orchestrator: &Orchestrator,
    paths: &[PathBuf],
    timeout: Duration,
    with_debug: bool,
) -> std::io::Result<Vec<FileReport>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let reports = runtime.block_on(classify_all(orchestrator, paths, timeout, with_debug));
    runtime.shutdown_background();
    Ok(reports)
}
