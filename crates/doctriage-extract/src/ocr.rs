//! OCR engines for the image path.

use std::io::{Cursor, Write};
use std::process::{Command, Stdio};

use doctriage_core::OcrConfig;
use image::{GrayImage, ImageFormat};
use tracing::debug;

use crate::OcrError;

/// Recognises text in a single-channel image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError>;
}

/// Tesseract run as a subprocess, image on stdin, text on stdout.
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    config: OcrConfig,
}

impl TesseractEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments passed to tesseract.
    pub fn args(&self) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language.clone(),
            "--oem".to_string(),
            self.config.oem.to_string(),
            "--psm".to_string(),
            self.config.psm.to_string(),
        ]
    }

    /// Whether the configured binary can be launched at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(OcrError::Encode)?;

        let mut child = Command::new(&self.config.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| OcrError::Spawn {
                binary: self.config.binary.clone(),
                source,
            })?;

        // Dropping stdin closes the pipe so tesseract sees EOF.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png)?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            width = image.width(),
            height = image.height(),
            chars = text.len(),
            "tesseract finished"
        );
        Ok(text)
    }
}
