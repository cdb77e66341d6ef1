use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::extraction::settings::{ExtractorConfig, LayoutParams, TableSettings};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub extractor: ExtractorConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ExtractorConfig::default();
        let layout_defaults = LayoutParams::default();
        let table_defaults = TableSettings::default();

        let extractor = ExtractorConfig {
            layout: LayoutParams {
                line_overlap: parse_env("LAYOUT_LINE_OVERLAP", layout_defaults.line_overlap)?,
                char_margin: parse_env("LAYOUT_CHAR_MARGIN", layout_defaults.char_margin)?,
                line_margin: parse_env("LAYOUT_LINE_MARGIN", layout_defaults.line_margin)?,
                word_margin: parse_env("LAYOUT_WORD_MARGIN", layout_defaults.word_margin)?,
                detect_vertical: parse_env(
                    "LAYOUT_DETECT_VERTICAL",
                    layout_defaults.detect_vertical,
                )?,
            },
            tables: TableSettings {
                intersection_tolerance: parse_env(
                    "TABLE_INTERSECTION_TOLERANCE",
                    table_defaults.intersection_tolerance,
                )?,
                snap_tolerance: parse_env("TABLE_SNAP_TOLERANCE", table_defaults.snap_tolerance)?,
                edge_min_length: parse_env(
                    "TABLE_EDGE_MIN_LENGTH",
                    table_defaults.edge_min_length,
                )?,
            },
            ocr_dpi: parse_env("OCR_DPI", defaults.ocr_dpi)?,
            image_dpi: parse_env("IMAGE_DPI", defaults.image_dpi)?,
            ocr_language: env_or("OCR_LANG", &defaults.ocr_language),
            ocr_page_segmentation: parse_env("OCR_PSM", defaults.ocr_page_segmentation)?,
            tesseract_cmd: env_or("TESSERACT_CMD", &defaults.tesseract_cmd),
            pdftoppm_cmd: env_or("PDFTOPPM_CMD", &defaults.pdftoppm_cmd),
        };

        let max_upload_mb: usize = parse_env("MAX_UPLOAD_MB", 10)?;

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "./uploads")),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            extractor,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_and_error() {
        assert_eq!(parse_env::<u32>("TALENT_TEST_UNSET_VARIABLE", 300).unwrap(), 300);

        std::env::set_var("TALENT_TEST_BAD_DPI", "three hundred");
        assert!(parse_env::<u32>("TALENT_TEST_BAD_DPI", 300).is_err());

        std::env::set_var("TALENT_TEST_VERTICAL", "false");
        assert!(!parse_env::<bool>("TALENT_TEST_VERTICAL", true).unwrap());
    }
}
