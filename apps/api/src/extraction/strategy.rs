//! Text strategies, tried in order until one recovers non-empty text.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::extraction::error::ExtractionError;
use crate::extraction::images::to_base64;
use crate::extraction::layout::document_text;
use crate::extraction::models::{ExtractionMethod, MethodDiagnostics};
use crate::extraction::normalize::normalize_text;
use crate::extraction::ocr::OcrEngine;
use crate::extraction::pdf::LoadedDocument;
use crate::extraction::raster::Rasterizer;
use crate::extraction::settings::ExtractorConfig;

/// Everything a strategy may read. The document is `None` when it failed to parse.
pub struct ExtractionContext<'a> {
    pub path: &'a Path,
    pub document: Option<&'a LoadedDocument>,
    pub config: &'a ExtractorConfig,
    pub rasterizer: &'a dyn Rasterizer,
    pub ocr: &'a dyn OcrEngine,
}

#[derive(Debug, Clone)]
pub struct TextOutput {
    /// Normalized, never empty.
    pub text: String,
    /// Extra images the strategy produced (OCR page rasters).
    pub images: Vec<String>,
    pub diagnostics: MethodDiagnostics,
}

pub trait TextStrategy: Send + Sync {
    fn method(&self) -> ExtractionMethod;

    /// Returns `NoContent` when the strategy ran but recovered no text.
    fn extract(&self, ctx: &ExtractionContext<'_>) -> Result<TextOutput, ExtractionError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Layout text
// ────────────────────────────────────────────────────────────────────────────

pub struct LayoutTextStrategy;

impl TextStrategy for LayoutTextStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::LayoutText
    }

    fn extract(&self, ctx: &ExtractionContext<'_>) -> Result<TextOutput, ExtractionError> {
        let doc = ctx.document.ok_or_else(|| {
            ExtractionError::InvalidDocument("document could not be parsed".to_string())
        })?;
        let text = normalize_text(&document_text(&doc.pages, &ctx.config.layout));
        if text.is_empty() {
            return Err(ExtractionError::NoContent);
        }
        Ok(TextOutput {
            diagnostics: MethodDiagnostics {
                success: true,
                pages: doc.page_count,
                char_count: text.chars().count(),
                page_errors: doc.page_errors,
                ..MethodDiagnostics::default()
            },
            text,
            images: Vec::new(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OCR
// ────────────────────────────────────────────────────────────────────────────

pub struct OcrStrategy;

impl TextStrategy for OcrStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Ocr
    }

    fn extract(&self, ctx: &ExtractionContext<'_>) -> Result<TextOutput, ExtractionError> {
        let dpi = ctx.config.ocr_dpi;
        let rasters = ctx.rasterizer.render_pages(ctx.path, dpi)?;

        let mut pages_text = Vec::with_capacity(rasters.len());
        let mut page_errors = 0;
        for (i, png) in rasters.iter().enumerate() {
            match ctx.ocr.recognize(png) {
                Ok(text) if !text.trim().is_empty() => pages_text.push(text),
                Ok(_) => {}
                Err(e) => {
                    warn!(page = i + 1, error = %e, "OCR failed for page");
                    page_errors += 1;
                }
            }
        }

        let text = normalize_text(&pages_text.join("\n\n"));
        if text.is_empty() {
            return Err(ExtractionError::NoContent);
        }
        Ok(TextOutput {
            diagnostics: MethodDiagnostics {
                success: true,
                pages: rasters.len(),
                char_count: text.chars().count(),
                page_errors,
                dpi: Some(dpi),
                ..MethodDiagnostics::default()
            },
            text,
            images: rasters.iter().map(|png| to_base64(png)).collect(),
        })
    }
}

/// The standard order: embedded text first, OCR as the fallback.
pub fn default_strategies() -> Vec<Box<dyn TextStrategy>> {
    vec![Box::new(LayoutTextStrategy), Box::new(OcrStrategy)]
}

/// Runs strategies in order and stops at the first success.
///
/// Every attempted strategy leaves a diagnostics record, keyed by method name.
pub fn run_strategies(
    strategies: &[Box<dyn TextStrategy>],
    ctx: &ExtractionContext<'_>,
) -> (
    Option<(ExtractionMethod, TextOutput)>,
    BTreeMap<String, MethodDiagnostics>,
) {
    let mut details = BTreeMap::new();
    for strategy in strategies {
        let method = strategy.method();
        match strategy.extract(ctx) {
            Ok(output) => {
                info!(
                    method = %method,
                    chars = output.diagnostics.char_count,
                    "Text strategy succeeded"
                );
                details.insert(method.as_str().to_string(), output.diagnostics.clone());
                return (Some((method, output)), details);
            }
            Err(e) => {
                info!(method = %method, error = %e, "Text strategy produced no content");
                let mut diagnostics = MethodDiagnostics::failed(e.to_string());
                diagnostics.pages = ctx.document.map(|d| d.page_count).unwrap_or(0);
                details.insert(method.as_str().to_string(), diagnostics);
            }
        }
    }
    (None, details)
}
