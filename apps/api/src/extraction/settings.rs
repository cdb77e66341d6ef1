use serde::{Deserialize, Serialize};

/// Tolerances for grouping positioned glyphs into lines, words and text blocks.
///
/// All margins are relative to glyph size, so the same values work across font sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Minimum vertical overlap (fraction of the smaller glyph height) for two
    /// glyphs to sit on the same line.
    pub line_overlap: f64,
    /// Maximum horizontal gap (in glyph widths) between glyphs of the same line.
    pub char_margin: f64,
    /// Maximum vertical gap (in line heights) between lines of the same block.
    pub line_margin: f64,
    /// Gap (in glyph sizes) above which a space is inserted between glyphs.
    pub word_margin: f64,
    /// Group vertically stacked glyphs into top-to-bottom lines.
    pub detect_vertical: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            line_overlap: 0.5,
            char_margin: 2.0,
            line_margin: 0.5,
            word_margin: 0.1,
            detect_vertical: true,
        }
    }
}

/// Tolerances for locating table grids from ruling lines, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    /// How far apart a horizontal and a vertical ruling may be and still intersect.
    pub intersection_tolerance: f64,
    /// Parallel rulings closer than this are snapped onto one coordinate.
    pub snap_tolerance: f64,
    /// Rulings shorter than this are ignored.
    pub edge_min_length: f64,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            intersection_tolerance: 5.0,
            snap_tolerance: 3.0,
            edge_min_length: 3.0,
        }
    }
}

/// Extractor-wide configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub layout: LayoutParams,
    pub tables: TableSettings,
    /// Rasterization resolution for the OCR fallback.
    pub ocr_dpi: u32,
    /// Rasterization resolution for cropping embedded images.
    pub image_dpi: u32,
    pub ocr_language: String,
    /// Tesseract page segmentation mode.
    pub ocr_page_segmentation: u8,
    pub tesseract_cmd: String,
    pub pdftoppm_cmd: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutParams::default(),
            tables: TableSettings::default(),
            ocr_dpi: 300,
            image_dpi: 150,
            ocr_language: "eng".to_string(),
            ocr_page_segmentation: 3,
            tesseract_cmd: "tesseract".to_string(),
            pdftoppm_cmd: "pdftoppm".to_string(),
        }
    }
}
