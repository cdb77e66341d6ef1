//! Document extractor: PDF path in, `ExtractionResult` out.
//!
//! The document is parsed and interpreted once. Tables and embedded images are always
//! collected; the text comes from the first strategy that recovers any. Failures below
//! the document level are logged and skipped.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::extraction::error::ExtractionError;
use crate::extraction::images::extract_images;
use crate::extraction::models::{
    DocumentInfo, ExtractionMetadata, ExtractionMethod, ExtractionResult, Table,
};
use crate::extraction::ocr::{OcrEngine, TesseractOcr};
use crate::extraction::pdf::{load_document, LoadedDocument};
use crate::extraction::raster::{PdftoppmRasterizer, Rasterizer};
use crate::extraction::settings::ExtractorConfig;
use crate::extraction::strategy::{
    default_strategies, run_strategies, ExtractionContext, TextStrategy,
};
use crate::extraction::tables::find_tables;

pub struct DocumentExtractor {
    config: ExtractorConfig,
    rasterizer: Box<dyn Rasterizer>,
    ocr: Box<dyn OcrEngine>,
    strategies: Vec<Box<dyn TextStrategy>>,
}

impl DocumentExtractor {
    pub fn new(
        config: ExtractorConfig,
        rasterizer: Box<dyn Rasterizer>,
        ocr: Box<dyn OcrEngine>,
    ) -> Self {
        Self {
            config,
            rasterizer,
            ocr,
            strategies: default_strategies(),
        }
    }

    /// Extractor backed by the `pdftoppm` and `tesseract` binaries named in `config`.
    pub fn from_config(config: ExtractorConfig) -> Self {
        let rasterizer = PdftoppmRasterizer::new(config.pdftoppm_cmd.clone());
        let ocr = TesseractOcr::new(
            config.tesseract_cmd.clone(),
            config.ocr_language.clone(),
            config.ocr_page_segmentation,
            config.ocr_dpi,
        );
        Self::new(config, Box::new(rasterizer), Box::new(ocr))
    }

    pub fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        info!(path = %path.display(), "Extracting document");
        let meta = std::fs::metadata(path).map_err(|e| ExtractionError::io(path, e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        let document = match load_document(path) {
            Ok(doc) => {
                debug!(
                    pages = doc.page_count,
                    glyphs = doc.glyph_count(),
                    page_errors = doc.page_errors,
                    "Parsed document"
                );
                Some(doc)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse PDF, only OCR can run");
                None
            }
        };

        let tables = document
            .as_ref()
            .map(|doc| self.tables(doc))
            .unwrap_or_default();
        let mut images = document
            .as_ref()
            .map(|doc| {
                extract_images(
                    path,
                    &doc.pages,
                    self.rasterizer.as_ref(),
                    self.config.image_dpi,
                )
            })
            .unwrap_or_default();

        let ctx = ExtractionContext {
            path,
            document: document.as_ref(),
            config: &self.config,
            rasterizer: self.rasterizer.as_ref(),
            ocr: self.ocr.as_ref(),
        };
        let (outcome, mut details) = run_strategies(&self.strategies, &ctx);

        let Some((method, output)) = outcome else {
            warn!(path = %path.display(), "No text strategy recovered content");
            return Err(ExtractionError::NoContent);
        };

        if let Some(layout) = details.get_mut(ExtractionMethod::LayoutText.as_str()) {
            layout.tables_found = Some(tables.len());
            layout.images_found = Some(images.len());
        }
        images.extend(output.images);

        info!(
            method = %method,
            chars = output.diagnostics.char_count,
            tables = tables.len(),
            images = images.len(),
            "Extraction complete"
        );

        let (page_count, document_info) = document
            .map(|doc| (doc.page_count, doc.info))
            .unwrap_or_else(|| (output.diagnostics.pages, DocumentInfo::default()));

        Ok(ExtractionResult {
            content: output.text,
            tables,
            images,
            metadata: ExtractionMetadata {
                file_name,
                file_size: meta.len(),
                file_extension,
                page_count,
                extraction_method: method,
                extraction_details: details,
                document_info,
            },
        })
    }

    fn tables(&self, doc: &LoadedDocument) -> Vec<Table> {
        doc.pages
            .iter()
            .flat_map(|page| find_tables(page, &self.config.tables, &self.config.layout))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use image::{GenericImageView, ImageFormat, RgbImage};

    use crate::extraction::pdf::fixtures::{image as place_image, line, rect, text, write_pdf};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    /// Renders every page as a blank square of `size` pixels.
    struct FakeRasterizer {
        size: u32,
        pages: usize,
    }

    impl Rasterizer for FakeRasterizer {
        fn render_pages(&self, _pdf: &Path, _dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError> {
            Ok((0..self.pages).map(|_| png(self.size, self.size)).collect())
        }

        fn render_page(
            &self,
            _pdf: &Path,
            _page: u32,
            _dpi: u32,
        ) -> Result<Vec<u8>, ExtractionError> {
            Ok(png(self.size, self.size))
        }
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn render_pages(&self, _pdf: &Path, _dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError> {
            Err(ExtractionError::Raster("no rasterizer".to_string()))
        }

        fn render_page(
            &self,
            _pdf: &Path,
            _page: u32,
            _dpi: u32,
        ) -> Result<Vec<u8>, ExtractionError> {
            Err(ExtractionError::Raster("no rasterizer".to_string()))
        }
    }

    /// Returns a fixed text and counts how often it was asked.
    struct FakeOcr {
        text: String,
        calls: Arc<AtomicUsize>,
    }

    impl OcrEngine for FakeOcr {
        fn recognize(&self, _png: &[u8]) -> Result<String, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.clone())
        }
    }

    fn extractor(ocr_text: &str, pages: usize) -> (DocumentExtractor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = ExtractorConfig {
            image_dpi: 72,
            ..ExtractorConfig::default()
        };
        let extractor = DocumentExtractor::new(
            config,
            Box::new(FakeRasterizer { size: 200, pages }),
            Box::new(FakeOcr {
                text: ocr_text.to_string(),
                calls: Arc::clone(&calls),
            }),
        );
        (extractor, calls)
    }

    fn fixture(
        dir: &tempfile::TempDir,
        name: &str,
        width: i64,
        pages: Vec<Vec<lopdf::content::Operation>>,
    ) -> PathBuf {
        let path = dir.path().join(name);
        write_pdf(&path, width, width, pages);
        path
    }

    #[test]
    fn test_embedded_text_uses_layout_and_skips_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let mut ops = text(72, 700, 10, "Jane Doe");
        ops.extend(text(72, 600, 10, "Education BSc Computer Science"));
        let path = fixture(&dir, "resume.pdf", 792, vec![ops]);

        let (extractor, ocr_calls) = extractor("should not be used", 1);
        let result = extractor.extract(&path).unwrap();

        assert_eq!(result.metadata.extraction_method, ExtractionMethod::LayoutText);
        assert_eq!(result.content, "Jane Doe\n\nEducation BSc Computer Science");
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.metadata.file_name, "resume.pdf");
        assert_eq!(result.metadata.file_extension, ".pdf");
        assert_eq!(result.metadata.page_count, 1);
        assert!(result.metadata.file_size > 0);
        assert_eq!(
            result.metadata.document_info.title.as_deref(),
            Some("Jane Doe Resume")
        );

        let layout = &result.metadata.extraction_details["layout-text"];
        assert!(layout.success);
        assert_eq!(layout.char_count, result.content.chars().count());
        assert_eq!(layout.tables_found, Some(0));
        assert!(!result.metadata.extraction_details.contains_key("ocr"));
    }

    #[test]
    fn test_image_only_pdf_falls_back_to_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "scan.pdf", 200, vec![vec![], vec![]]);

        let (extractor, ocr_calls) = extractor("Jane   Doe\nSKILLS Rust", 2);
        let result = extractor.extract(&path).unwrap();

        assert_eq!(result.metadata.extraction_method, ExtractionMethod::Ocr);
        assert_eq!(result.content, "Jane Doe\n\nSKILLS Rust Jane Doe\n\nSKILLS Rust");
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.images.len(), 2);

        let details = &result.metadata.extraction_details;
        assert!(!details["layout-text"].success);
        assert_eq!(details["layout-text"].error.as_deref(), Some("no content extracted"));
        assert!(details["ocr"].success);
        assert_eq!(details["ocr"].dpi, Some(300));
        assert_eq!(details["ocr"].pages, 2);
    }

    #[test]
    fn test_blank_pdf_with_empty_ocr_has_no_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "blank.pdf", 200, vec![vec![]]);

        let (extractor, _) = extractor("   \n", 1);
        let err = extractor.extract(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::NoContent));
        assert_eq!(err.to_string(), "no content extracted");
    }

    #[test]
    fn test_blank_pdf_without_rasterizer_has_no_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "blank.pdf", 200, vec![vec![]]);

        let extractor = DocumentExtractor::new(
            ExtractorConfig::default(),
            Box::new(FailingRasterizer),
            Box::new(FakeOcr {
                text: "unused".to_string(),
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        assert!(matches!(extractor.extract(&path), Err(ExtractionError::NoContent)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let (extractor, _) = extractor("text", 1);
        let err = extractor.extract(Path::new("/nonexistent/resume.pdf")).unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }

    #[test]
    fn test_unparseable_file_still_gets_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 this is not a pdf").unwrap();

        let (extractor, _) = extractor("Recovered text", 1);
        let result = extractor.extract(&path).unwrap();
        assert_eq!(result.metadata.extraction_method, ExtractionMethod::Ocr);
        assert_eq!(result.content, "Recovered text");
        assert_eq!(result.metadata.page_count, 1);
        assert!(result.tables.is_empty());
    }

    #[test]
    fn test_tables_are_extracted_alongside_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut ops = rect(100, 500, 200, 40);
        ops.extend(line(100, 520, 300, 520));
        ops.extend(line(200, 500, 200, 540));
        ops.extend(text(105, 525, 10, "Degree"));
        ops.extend(text(205, 525, 10, "Year"));
        ops.extend(text(105, 505, 10, "BSc"));
        ops.extend(text(205, 505, 10, "2020"));
        let path = fixture(&dir, "table.pdf", 792, vec![ops]);

        let (extractor, _) = extractor("unused", 1);
        let result = extractor.extract(&path).unwrap();
        assert_eq!(result.tables.len(), 1);
        assert_eq!(
            result.tables[0],
            vec![
                vec![Some("Degree".to_string()), Some("Year".to_string())],
                vec![Some("BSc".to_string()), Some("2020".to_string())],
            ]
        );
        assert_eq!(
            result.metadata.extraction_details["layout-text"].tables_found,
            Some(1)
        );
    }

    #[test]
    fn test_embedded_image_is_cropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut ops = text(10, 150, 10, "Portfolio");
        ops.extend(place_image(10, 20, 100, 50));
        let path = fixture(&dir, "photo.pdf", 200, vec![ops]);

        let (extractor, _) = extractor("unused", 1);
        let result = extractor.extract(&path).unwrap();
        assert_eq!(result.metadata.extraction_method, ExtractionMethod::LayoutText);
        assert_eq!(result.images.len(), 1);

        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&result.images[0])
            .unwrap();
        let cropped = image::load_from_memory(&bytes).unwrap();
        assert_eq!(cropped.dimensions(), (100, 50));
        assert_eq!(
            result.metadata.extraction_details["layout-text"].images_found,
            Some(1)
        );
    }

    #[test]
    fn test_broken_page_keeps_text_and_tables_of_other_pages() {
        use lopdf::content::Operation;
        use lopdf::Object;

        let dir = tempfile::tempdir().unwrap();
        let broken = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            Operation::new("Td", vec![Object::Integer(72), Object::Integer(700)]),
            Operation::new("Tj", vec![Object::Integer(42)]),
            Operation::new("ET", vec![]),
        ];
        let mut good = text(72, 700, 10, "Jane Doe");
        good.extend(rect(100, 500, 200, 40));
        good.extend(line(100, 520, 300, 520));
        good.extend(line(200, 500, 200, 540));
        good.extend(text(105, 525, 10, "Degree"));
        good.extend(text(205, 525, 10, "Year"));
        good.extend(text(105, 505, 10, "BSc"));
        good.extend(text(205, 505, 10, "2020"));
        let path = fixture(&dir, "mixed.pdf", 792, vec![broken, good]);

        let (extractor, ocr_calls) = extractor("unused", 2);
        let result = extractor.extract(&path).unwrap();

        assert_eq!(result.metadata.extraction_method, ExtractionMethod::LayoutText);
        assert!(result.content.starts_with("Jane Doe"));
        assert_eq!(result.metadata.page_count, 2);
        assert_eq!(result.tables.len(), 1);
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);

        let layout = &result.metadata.extraction_details["layout-text"];
        assert!(layout.success);
        assert_eq!(layout.page_errors, 1);
        assert_eq!(layout.tables_found, Some(1));
    }

    /// Fails on the `fail_on`-th call and returns `text` otherwise.
    struct FlakyOcr {
        text: String,
        fail_on: usize,
        calls: AtomicUsize,
    }

    impl OcrEngine for FlakyOcr {
        fn recognize(&self, _png: &[u8]) -> Result<String, ExtractionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.fail_on {
                return Err(ExtractionError::Ocr("tesseract exited with 1".to_string()));
            }
            Ok(format!("{} {call}", self.text))
        }
    }

    #[test]
    fn test_ocr_failure_on_one_page_is_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "scan.pdf", 200, vec![vec![], vec![], vec![]]);

        let extractor = DocumentExtractor::new(
            ExtractorConfig::default(),
            Box::new(FakeRasterizer { size: 50, pages: 3 }),
            Box::new(FlakyOcr {
                text: "Page".to_string(),
                fail_on: 2,
                calls: AtomicUsize::new(0),
            }),
        );
        let result = extractor.extract(&path).unwrap();

        assert_eq!(result.metadata.extraction_method, ExtractionMethod::Ocr);
        assert_eq!(result.content, "Page 1 Page 3");
        let ocr = &result.metadata.extraction_details["ocr"];
        assert!(ocr.success);
        assert_eq!(ocr.pages, 3);
        assert_eq!(ocr.page_errors, 1);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "resume.pdf", 792, vec![text(72, 700, 10, "Skills Rust Go")]);
        let (extractor, _) = extractor("unused", 1);
        assert_eq!(extractor.extract(&path).unwrap(), extractor.extract(&path).unwrap());
    }
}
