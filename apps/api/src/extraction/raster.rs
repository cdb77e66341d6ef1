//! Page rasterization through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::extraction::error::ExtractionError;

/// Renders PDF pages to PNG bytes.
pub trait Rasterizer: Send + Sync {
    /// Every page, in page order.
    fn render_pages(&self, pdf: &Path, dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError>;

    /// One page, 1-based.
    fn render_page(&self, pdf: &Path, page: u32, dpi: u32) -> Result<Vec<u8>, ExtractionError>;
}

#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: String,
}

impl PdftoppmRasterizer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[String]) -> Result<(), ExtractionError> {
        debug!(binary = %self.binary, ?args, "Running rasterizer");
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| ExtractionError::Raster(format!("failed to run {}: {e}", self.binary)))?;
        if !output.status.success() {
            return Err(ExtractionError::Raster(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn render_pages(&self, pdf: &Path, dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError> {
        let dir = tempfile::tempdir().map_err(|e| ExtractionError::io(pdf, e))?;
        let prefix = dir.path().join("page");
        self.run(&[
            "-png".to_string(),
            "-r".to_string(),
            dpi.to_string(),
            pdf.display().to_string(),
            prefix.display().to_string(),
        ])?;

        // pdftoppm zero-pads page numbers to a common width, so name order is page order.
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir.path())
            .map_err(|e| ExtractionError::io(dir.path(), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("png"))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(ExtractionError::Raster(
                "rasterizer produced no images".to_string(),
            ));
        }
        files
            .iter()
            .map(|f| std::fs::read(f).map_err(|e| ExtractionError::io(f, e)))
            .collect()
    }

    fn render_page(&self, pdf: &Path, page: u32, dpi: u32) -> Result<Vec<u8>, ExtractionError> {
        let dir = tempfile::tempdir().map_err(|e| ExtractionError::io(pdf, e))?;
        let prefix = dir.path().join("page");
        self.run(&[
            "-png".to_string(),
            "-r".to_string(),
            dpi.to_string(),
            "-f".to_string(),
            page.to_string(),
            "-l".to_string(),
            page.to_string(),
            "-singlefile".to_string(),
            pdf.display().to_string(),
            prefix.display().to_string(),
        ])?;
        let file = prefix.with_extension("png");
        std::fs::read(&file).map_err(|e| ExtractionError::io(&file, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_a_raster_error() {
        let rasterizer = PdftoppmRasterizer::new("definitely-not-a-real-pdftoppm");
        let err = rasterizer
            .render_pages(Path::new("/nonexistent.pdf"), 72)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Raster(_)));
        assert!(err.to_string().contains("definitely-not-a-real-pdftoppm"));
    }
}
