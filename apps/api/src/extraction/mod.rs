//! Document extraction.
//!
//! A PDF is parsed once with `lopdf`; `pdf-extract` drives each page's text and path
//! operators into a layout collector while a small `lopdf` walk records image placements (`pdf`).
//! Positioned glyphs feed the layout text pass (`layout`), ruling lines feed table
//! detection (`tables`), and image placements are cropped out of page renders
//! (`images`). When no embedded text exists, pages are rasterized (`raster`) and
//! read by OCR (`ocr`). `extractor::DocumentExtractor` ties the pieces together.

pub mod error;
pub mod extractor;
pub mod geometry;
pub mod handlers;
pub mod images;
pub mod layout;
pub mod models;
pub mod normalize;
pub mod ocr;
pub mod pdf;
pub mod raster;
pub mod settings;
pub mod strategy;
pub mod tables;

pub use error::ExtractionError;
pub use extractor::DocumentExtractor;
pub use models::ExtractionResult;
pub use settings::ExtractorConfig;
