use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A table is an ordered list of rows, each an ordered list of cells.
/// `None` marks a grid position with no cell (merged or missing); `Some("")` an empty cell.
pub type Table = Vec<Vec<Option<String>>>;

/// Which text strategy produced `ExtractionResult::content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExtractionMethod {
    #[serde(rename = "layout-text")]
    LayoutText,
    #[serde(rename = "ocr")]
    Ocr,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::LayoutText => "layout-text",
            ExtractionMethod::Ocr => "ocr",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-strategy diagnostic record. Every attempted strategy leaves one, success or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDiagnostics {
    pub success: bool,
    pub pages: usize,
    pub char_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables_found: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images_found: Option<usize>,
    #[serde(default)]
    pub page_errors: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MethodDiagnostics {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Document Info dictionary fields, when the PDF carries one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub file_name: String,
    pub file_size: u64,
    pub file_extension: String,
    pub page_count: usize,
    pub extraction_method: ExtractionMethod,
    /// Keyed by `ExtractionMethod::as_str()`, in attempt order of the strategy list.
    pub extraction_details: BTreeMap<String, MethodDiagnostics>,
    #[serde(default)]
    pub document_info: DocumentInfo,
}

/// Raw structured content recovered from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub content: String,
    pub tables: Vec<Table>,
    /// Base64-encoded PNG blobs.
    pub images: Vec<String>,
    pub metadata: ExtractionMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serializes_with_hyphenated_name() {
        let json = serde_json::to_string(&ExtractionMethod::LayoutText).unwrap();
        assert_eq!(json, r#""layout-text""#);
        let back: ExtractionMethod = serde_json::from_str(r#""ocr""#).unwrap();
        assert_eq!(back, ExtractionMethod::Ocr);
    }

    #[test]
    fn test_failed_diagnostics_omit_counters() {
        let diag = MethodDiagnostics::failed("pdftoppm not found");
        let value = serde_json::to_value(&diag).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "pdftoppm not found");
        assert!(value.get("dpi").is_none());
    }
}
