mod batch;
mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use doctriage_extract::TesseractEngine;
use doctriage_pipeline::{ClassifierContext, Orchestrator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, ClassifyArgs, Command, SignaturesArgs};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only JSON.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Classify(args) => classify(args),
        Command::Signatures(args) => signatures(args),
    }
}

fn classify(args: ClassifyArgs) -> anyhow::Result<()> {
    info!("doctriage v{}", env!("CARGO_PKG_VERSION"));
    let config = args.pipeline_config()?;

    if !TesseractEngine::new(config.ocr.clone()).is_available() {
        warn!(
            binary = %config.ocr.binary.display(),
            "tesseract not found; image files will fall back to filename classification"
        );
    }

    let context = ClassifierContext::from_config(&config).context("building classifier")?;
    let orchestrator = Orchestrator::new(Arc::new(context));

    let timeout = Duration::from_secs(args.timeout_secs);
    let reports = batch::run_batch(&orchestrator, &args.files, timeout, args.debug)
        .context("starting async runtime")?;

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn signatures(args: SignaturesArgs) -> anyhow::Result<()> {
    let set = args.sources.signature_set()?;
    println!("{}", set.to_json_pretty()?);
    Ok(())
}
