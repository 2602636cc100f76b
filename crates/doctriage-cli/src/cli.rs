//! Command-line arguments and their mapping onto pipeline configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use doctriage_core::{PipelineConfig, SignatureSet};

#[derive(Parser, Debug)]
#[command(name = "doctriage", version)]
#[command(about = "Classify PDFs and scans as driver's licences, bank statements, or invoices")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify files and print one JSON result per file
    Classify(ClassifyArgs),
    /// Print the active signature table as JSON
    Signatures(SignaturesArgs),
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Files to classify (pdf, jpg, jpeg, png)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Trained model artifact
    #[arg(long, env = "DOCTRIAGE_MODEL")]
    pub model: Option<PathBuf>,

    /// Skip the statistical stage entirely
    #[arg(long)]
    pub no_model: bool,

    #[command(flatten)]
    pub sources: ConfigSources,

    /// Probability the model must exceed for its answer to be accepted
    #[arg(long)]
    pub model_threshold: Option<f64>,

    /// Minimum keyword score for a keyword answer
    #[arg(long)]
    pub keyword_threshold: Option<f64>,

    /// Per-file time limit
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Include debug_info in the output
    #[arg(long)]
    pub debug: bool,
}

#[derive(Args, Debug)]
pub struct SignaturesArgs {
    #[command(flatten)]
    pub sources: ConfigSources,
}

/// Where configuration comes from, shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct ConfigSources {
    /// Signature table JSON file
    #[arg(long, env = "DOCTRIAGE_SIGNATURES")]
    pub signatures: Option<PathBuf>,

    /// Pipeline configuration JSON file
    #[arg(long, env = "DOCTRIAGE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ConfigSources {
    /// Config file (or defaults) with the signature path override applied.
    pub fn load(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(path) = &self.signatures {
            config.signatures_path = Some(path.clone());
        }
        Ok(config)
    }

    pub fn signature_set(&self) -> anyhow::Result<SignatureSet> {
        let config = self.load()?;
        match &config.signatures_path {
            Some(path) => SignatureSet::load(path)
                .with_context(|| format!("loading signatures {}", path.display())),
            None => Ok(SignatureSet::builtin()),
        }
    }
}

impl ClassifyArgs {
    /// Resolve the effective configuration: file, then flags.
    pub fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = self.sources.load()?;
        if let Some(path) = &self.model {
            config.model_path = Some(path.clone());
        }
        if self.no_model {
            config.model_path = None;
        }
        if let Some(t) = self.model_threshold {
            config.thresholds.statistical = t;
        }
        if let Some(t) = self.keyword_threshold {
            config.thresholds.keyword = t;
        }
        config.validate().context("invalid thresholds")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    fn parse(args: &[&str]) -> ClassifyArgs {
        let mut argv = vec!["doctriage", "classify"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Classify(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn classify_defaults() {
        let args = parse(&["a.pdf", "b.png"]);
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.timeout_secs, 120);
        assert!(!args.debug);
    }

    #[test]
    fn classify_requires_files() {
        assert!(Cli::try_parse_from(["doctriage", "classify"]).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"model_path": "from-file.json", "thresholds": {{"keyword": 0.2}}}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let config = parse(&["x.pdf", "--config", path, "--model-threshold", "0.6"])
            .pipeline_config()
            .unwrap();
        assert_eq!(config.model_path.as_deref(), Some(Path::new("from-file.json")));
        assert_eq!(config.thresholds.statistical, 0.6);
        assert_eq!(config.thresholds.keyword, 0.2);

        let config = parse(&["x.pdf", "--config", path, "--model", "other.json"])
            .pipeline_config()
            .unwrap();
        assert_eq!(config.model_path.as_deref(), Some(Path::new("other.json")));
    }

    #[test]
    fn no_model_disables_statistical_stage() {
        let config = parse(&["x.pdf", "--no-model"]).pipeline_config().unwrap();
        assert!(config.model_path.is_none());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(
            parse(&["x.pdf", "--keyword-threshold", "2"])
                .pipeline_config()
                .is_err()
        );
    }

    #[test]
    fn builtin_signatures_without_overrides() {
        let set = ConfigSources::default().signature_set().unwrap();
        assert_eq!(set, SignatureSet::builtin());
    }
}
