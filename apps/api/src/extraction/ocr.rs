//! Optical character recognition through the `tesseract` CLI.

use std::process::Command;

use tracing::debug;

use crate::extraction::error::ExtractionError;

/// Recognizes text in one PNG page image.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, png: &[u8]) -> Result<String, ExtractionError>;
}

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: String,
    language: String,
    page_segmentation: u8,
    dpi: u32,
}

impl TesseractOcr {
    pub fn new(
        binary: impl Into<String>,
        language: impl Into<String>,
        page_segmentation: u8,
        dpi: u32,
    ) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            page_segmentation,
            dpi,
        }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, png: &[u8]) -> Result<String, ExtractionError> {
        let dir = tempfile::tempdir().map_err(|e| ExtractionError::Ocr(e.to_string()))?;
        let image = dir.path().join("page.png");
        std::fs::write(&image, png).map_err(|e| ExtractionError::io(&image, e))?;

        debug!(binary = %self.binary, lang = %self.language, "Running OCR");
        let output = Command::new(&self.binary)
            .arg(&image)
            .arg("stdout")
            .args(["-l", &self.language])
            .args(["--psm", &self.page_segmentation.to_string()])
            .args(["--dpi", &self.dpi.to_string()])
            .output()
            .map_err(|e| ExtractionError::Ocr(format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(ExtractionError::Ocr(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_an_ocr_error() {
        let ocr = TesseractOcr::new("definitely-not-a-real-tesseract", "eng", 3, 300);
        let err = ocr.recognize(&[0x89, b'P', b'N', b'G']).unwrap_err();
        assert!(matches!(err, ExtractionError::Ocr(_)));
    }
}
