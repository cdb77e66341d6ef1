//! Page interpretation on top of `lopdf` and `pdf-extract`.
//!
//! `pdf-extract` runs each page's text and path operators and reports glyphs and painted
//! paths to a [`LayoutCollector`], which turns them into positioned glyphs (layout text)
//! and axis-aligned segments (table rulings). Image XObjects are located by a separate
//! `lopdf` walk that only follows `q`/`Q`/`cm`/`Do`, recursing into Form XObjects.
//!
//! `pdf-extract` panics on some malformed input, so every page runs behind
//! `catch_unwind` and a failing page is counted and skipped.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use pdf_extract::{ColorSpace, MediaBox, OutputDev, OutputError, PathOp, Transform};
use tracing::{debug, warn};

use crate::extraction::error::ExtractionError;
use crate::extraction::geometry::{
    BBox, Glyph, ImagePlacement, Matrix, Orientation, PageLayout, Ruling,
};
use crate::extraction::models::DocumentInfo;

const MAX_FORM_DEPTH: usize = 8;
const MAX_PARENT_DEPTH: usize = 32;
/// Endpoints within this many points on one axis make a segment axis-aligned.
const AXIS_EPSILON: f64 = 0.5;
/// US Letter, used when no MediaBox is found up the page tree.
const DEFAULT_MEDIA_BOX: BBox = BBox {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

/// A parsed document with every page interpreted.
#[derive(Debug)]
pub struct LoadedDocument {
    pub page_count: usize,
    pub pages: Vec<PageLayout>,
    /// Pages that could not be interpreted.
    pub page_errors: usize,
    pub info: DocumentInfo,
}

impl LoadedDocument {
    pub fn glyph_count(&self) -> usize {
        self.pages.iter().map(|p| p.glyphs.len()).sum()
    }
}

pub fn load_document(path: &Path) -> Result<LoadedDocument, ExtractionError> {
    let doc = Document::load(path)?;
    let text_doc = text_document(&doc);
    let pages = doc.get_pages();
    let page_count = pages.len();
    let mut layouts = Vec::with_capacity(page_count);
    let mut page_errors = 0;

    for (number, page_id) in pages {
        match interpret_page(&doc, &text_doc, number, page_id) {
            Ok(layout) => layouts.push(layout),
            Err(e) => {
                warn!(page = number, error = %e, "Failed to interpret page content");
                page_errors += 1;
            }
        }
    }

    Ok(LoadedDocument {
        page_count,
        pages: layouts,
        page_errors,
        info: document_info(&doc),
    })
}

/// Checks the file exists, carries a `.pdf` extension and parses with at least one page.
pub fn validate_pdf(path: &Path) -> Result<usize, ExtractionError> {
    let meta = std::fs::metadata(path).map_err(|e| ExtractionError::io(path, e))?;
    if !meta.is_file() {
        return Err(ExtractionError::InvalidDocument(format!(
            "{} is not a file",
            path.display()
        )));
    }
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(ExtractionError::InvalidDocument(format!(
            "{} does not have a .pdf extension",
            path.display()
        )));
    }
    let pages = Document::load(path)?.get_pages().len();
    if pages == 0 {
        return Err(ExtractionError::InvalidDocument(
            "document has no pages".to_string(),
        ));
    }
    Ok(pages)
}

fn interpret_page(
    doc: &Document,
    text_doc: &Document,
    number: u32,
    page_id: ObjectId,
) -> Result<PageLayout, ExtractionError> {
    let page = doc.get_dictionary(page_id)?;
    let media_box = inherited(doc, page, b"MediaBox")
        .and_then(|o| rect_of(doc, o))
        .unwrap_or(DEFAULT_MEDIA_BOX);
    let rotation = inherited(doc, page, b"Rotate")
        .and_then(self::number)
        .map(normalize_rotation)
        .unwrap_or(0);

    let mut layout = PageLayout {
        number,
        media_box,
        rotation,
        glyphs: Vec::new(),
        rulings: Vec::new(),
        images: Vec::new(),
    };
    collect_text_and_paths(text_doc, &mut layout)?;

    let empty = Dictionary::new();
    let resources = match inherited(doc, page, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        _ => &empty,
    };
    let content = doc.get_page_content(page_id)?;
    let mut placements = ImageScanner { doc, images: Vec::new() };
    placements.run(&content, resources, Matrix::IDENTITY, 0)?;
    layout.images = placements.images;

    debug!(
        page = number,
        glyphs = layout.glyphs.len(),
        rulings = layout.rulings.len(),
        images = layout.images.len(),
        rotation,
        "Interpreted page"
    );
    Ok(layout)
}

/// Multiples of 90 in `0..360`; anything else is treated as unrotated.
fn normalize_rotation(degrees: f64) -> u16 {
    let degrees = degrees.round() as i64;
    match degrees.rem_euclid(360) {
        r @ (0 | 90 | 180 | 270) => r as u16,
        _ => 0,
    }
}

/// Copy of `doc` prepared for `pdf-extract`.
///
/// Image XObjects become empty forms, since `pdf-extract` parses any `Do` target as a
/// content stream, and pages without an inherited MediaBox get the default one.
fn text_document(doc: &Document) -> Document {
    let mut text_doc = doc.clone();
    for object in text_doc.objects.values_mut() {
        let Object::Stream(stream) = object else {
            continue;
        };
        let is_image =
            matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image");
        if is_image {
            *stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![0, 0, 1, 1].into_iter().map(Object::Integer).collect::<Vec<_>>(),
                },
                Vec::new(),
            );
        }
    }

    let unboxed: Vec<ObjectId> = doc
        .get_pages()
        .into_values()
        .filter(|id| {
            doc.get_dictionary(*id)
                .map(|page| inherited(doc, page, b"MediaBox").is_none())
                .unwrap_or(false)
        })
        .collect();
    for id in unboxed {
        if let Ok(page) = text_doc.get_dictionary_mut(id) {
            page.set(
                "MediaBox",
                vec![
                    Object::Real(DEFAULT_MEDIA_BOX.x0 as f32),
                    Object::Real(DEFAULT_MEDIA_BOX.y0 as f32),
                    Object::Real(DEFAULT_MEDIA_BOX.x1 as f32),
                    Object::Real(DEFAULT_MEDIA_BOX.y1 as f32),
                ],
            );
        }
    }
    text_doc
}

fn collect_text_and_paths(doc: &Document, layout: &mut PageLayout) -> Result<(), ExtractionError> {
    let number = layout.number;
    let mut collector = LayoutCollector { layout };
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::output_doc_page(doc, &mut collector, number)
    }));
    match outcome {
        Ok(result) => result.map_err(ExtractionError::from),
        Err(payload) => Err(ExtractionError::InvalidDocument(format!(
            "page {number} could not be interpreted: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout collector
// ────────────────────────────────────────────────────────────────────────────

impl From<&Transform> for Matrix {
    fn from(t: &Transform) -> Self {
        Matrix::new(t.m11, t.m12, t.m21, t.m22, t.m31, t.m32)
    }
}

/// Receives `pdf-extract` callbacks for one page.
struct LayoutCollector<'a> {
    layout: &'a mut PageLayout,
}

impl LayoutCollector<'_> {
    fn paint(&mut self, ctm: &Transform, path: &pdf_extract::Path) {
        let ctm = Matrix::from(ctm);
        for ((x0, y0), (x1, y1)) in segments(&ctm, &path.ops) {
            let dx = (x1 - x0).abs();
            let dy = (y1 - y0).abs();
            if dx < AXIS_EPSILON && dy < AXIS_EPSILON {
                continue;
            }
            if dy < AXIS_EPSILON {
                self.layout.rulings.push(Ruling {
                    orientation: Orientation::Horizontal,
                    position: (y0 + y1) / 2.0,
                    start: x0.min(x1),
                    end: x0.max(x1),
                });
            } else if dx < AXIS_EPSILON {
                self.layout.rulings.push(Ruling {
                    orientation: Orientation::Vertical,
                    position: (x0 + x1) / 2.0,
                    start: y0.min(y1),
                    end: y0.max(y1),
                });
            }
        }
    }
}

impl OutputDev for LayoutCollector<'_> {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        debug!(page = page_num, width = media_box.urx - media_box.llx, "Collecting page layout");
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    // `trm` omits the font size; `width` is the advance per unit of font size.
    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        text: &str,
    ) -> Result<(), OutputError> {
        if text.is_empty() || !font_size.is_finite() {
            return Ok(());
        }
        let trm = Matrix::from(trm);
        let advance = width * font_size;
        let corners = [
            trm.apply(0.0, 0.0),
            trm.apply(advance, 0.0),
            trm.apply(0.0, font_size),
            trm.apply(advance, font_size),
        ];
        self.layout.glyphs.push(Glyph {
            text: text.to_string(),
            bbox: BBox::enclosing(&corners),
            upright: trm.a.abs() >= trm.b.abs(),
        });
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn stroke(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &pdf_extract::Path,
    ) -> Result<(), OutputError> {
        self.paint(ctm, path);
        Ok(())
    }

    fn fill(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &pdf_extract::Path,
    ) -> Result<(), OutputError> {
        self.paint(ctm, path);
        Ok(())
    }
}

/// Straight segments of a path in page space. Curves only move the current point.
fn segments(ctm: &Matrix, ops: &[PathOp]) -> Vec<((f64, f64), (f64, f64))> {
    let mut out = Vec::new();
    let mut current: Option<(f64, f64)> = None;
    let mut start: Option<(f64, f64)> = None;
    for op in ops {
        match *op {
            PathOp::MoveTo(x, y) => {
                current = Some(ctm.apply(x, y));
                start = current;
            }
            PathOp::LineTo(x, y) => {
                let to = ctm.apply(x, y);
                if let Some(from) = current {
                    out.push((from, to));
                }
                current = Some(to);
            }
            PathOp::CurveTo(_, _, _, _, x, y) => current = Some(ctm.apply(x, y)),
            PathOp::Rect(x, y, w, h) => {
                let corners = [
                    ctm.apply(x, y),
                    ctm.apply(x + w, y),
                    ctm.apply(x + w, y + h),
                    ctm.apply(x, y + h),
                ];
                for i in 0..4 {
                    out.push((corners[i], corners[(i + 1) % 4]));
                }
                current = Some(corners[0]);
                start = current;
            }
            PathOp::Close => {
                if let (Some(from), Some(to)) = (current, start) {
                    out.push((from, to));
                }
                current = start;
            }
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Image placements
// ────────────────────────────────────────────────────────────────────────────

struct ImageScanner<'a> {
    doc: &'a Document,
    images: Vec<ImagePlacement>,
}

impl<'a> ImageScanner<'a> {
    fn run(
        &mut self,
        content: &[u8],
        resources: &'a Dictionary,
        ctm: Matrix,
        depth: usize,
    ) -> Result<(), ExtractionError> {
        let content = Content::decode(content)?;
        let mut ctm = ctm;
        let mut saved: Vec<Matrix> = Vec::new();

        for op in &content.operations {
            let args = &op.operands;
            match op.operator.as_str() {
                "q" => saved.push(ctm),
                "Q" => {
                    if let Some(prev) = saved.pop() {
                        ctm = prev;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_of(args) {
                        ctm = m.then(&ctm);
                    }
                }
                "Do" => {
                    if let Some(name) = args.first().and_then(name_of) {
                        self.draw_xobject(resources, &name, &ctm, depth);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn draw_xobject(&mut self, resources: &'a Dictionary, name: &str, ctm: &Matrix, depth: usize) {
        let doc = self.doc;
        let Some(Object::Stream(stream)) = lookup(doc, resources, b"XObject", name) else {
            return;
        };
        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(name_of)
            .unwrap_or_default();

        match subtype.as_str() {
            "Image" => self.images.push(ImagePlacement {
                name: name.to_string(),
                bbox: ctm.unit_square_bounds(),
            }),
            "Form" if depth < MAX_FORM_DEPTH => {
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|o| match resolve(doc, o) {
                        Object::Array(items) => matrix_of(items),
                        _ => None,
                    })
                    .unwrap_or(Matrix::IDENTITY);
                let form_resources = match stream.dict.get(b"Resources").map(|o| resolve(doc, o)) {
                    Ok(Object::Dictionary(dict)) => dict,
                    _ => resources,
                };
                let content = decoded_stream(stream);
                if let Err(e) = self.run(&content, form_resources, form_matrix.then(ctm), depth + 1) {
                    warn!(form = name, error = %e, "Failed to scan form XObject");
                }
            }
            "Form" => warn!(form = name, "Form XObject nesting too deep, skipping"),
            _ => {}
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Object helpers
// ────────────────────────────────────────────────────────────────────────────

/// Follows references until a direct object is reached.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    for _ in 0..MAX_PARENT_DEPTH {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(next) => current = next,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn name_of(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn string_of(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

fn decoded_stream(stream: &lopdf::Stream) -> Vec<u8> {
    if stream.dict.get(b"Filter").is_ok() {
        stream.decompressed_content().unwrap_or_default()
    } else {
        stream.content.clone()
    }
}

fn matrix_of(args: &[Object]) -> Option<Matrix> {
    let values: Vec<f64> = args.iter().take(6).filter_map(number).collect();
    match values.as_slice() {
        [a, b, c, d, e, f] => Some(Matrix::new(*a, *b, *c, *d, *e, *f)),
        _ => None,
    }
}

fn rect_of(doc: &Document, obj: &Object) -> Option<BBox> {
    let Object::Array(items) = resolve(doc, obj) else {
        return None;
    };
    let values: Vec<f64> = items
        .iter()
        .filter_map(|o| number(resolve(doc, o)))
        .collect();
    match values.as_slice() {
        [x0, y0, x1, y1] => Some(BBox::new(*x0, *y0, *x1, *y1)),
        _ => None,
    }
}

/// Looks a key up on a page and then its ancestors in the page tree.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value));
        }
        match node.get(b"Parent").map(|p| resolve(doc, p)) {
            Ok(Object::Dictionary(parent)) => node = parent,
            _ => return None,
        }
    }
    None
}

fn lookup<'a>(
    doc: &'a Document,
    resources: &'a Dictionary,
    category: &[u8],
    name: &str,
) -> Option<&'a Object> {
    match resources.get(category).map(|o| resolve(doc, o)) {
        Ok(Object::Dictionary(dict)) => dict.get(name.as_bytes()).ok().map(|o| resolve(doc, o)),
        _ => None,
    }
}

/// PDFDocEncoding code points 0x80..=0xA0 that differ from Latin-1.
const PDF_DOC_HIGH: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
    '\u{20AC}',
];

/// PDFDocEncoding code points 0x18..=0x1F (spacing accents).
const PDF_DOC_ACCENTS: [char; 8] = [
    '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}', '\u{02DC}',
];

fn pdf_doc_char(byte: u8) -> char {
    match byte {
        0x18..=0x1F => PDF_DOC_ACCENTS[usize::from(byte - 0x18)],
        0x80..=0xA0 => PDF_DOC_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

/// Decodes a text string: UTF-16BE after a BOM, otherwise PDFDocEncoding.
fn text_string(obj: &Object) -> Option<String> {
    let bytes = string_of(obj)?;
    let text = if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks(2)
            .map(|pair| (u16::from(pair[0]) << 8) | u16::from(pair.get(1).copied().unwrap_or(0)))
            .collect();
        String::from_utf16_lossy(&units)
    } else if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        String::from_utf8_lossy(utf8).into_owned()
    } else {
        bytes.iter().map(|b| pdf_doc_char(*b)).collect()
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn document_info(doc: &Document) -> DocumentInfo {
    let info = match doc.trailer.get(b"Info").map(|o| resolve(doc, o)) {
        Ok(Object::Dictionary(dict)) => dict,
        _ => return DocumentInfo::default(),
    };
    let field = |key: &[u8]| info.get(key).ok().and_then(|o| text_string(resolve(doc, o)));
    DocumentInfo {
        title: field(b"Title"),
        author: field(b"Author"),
        creator: field(b"Creator"),
        producer: field(b"Producer"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test fixtures
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::fixtures::{image as place_image, *};
    use super::*;
    use lopdf::StringFormat;

    #[test]
    fn test_text_glyph_positions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.pdf");
        write_pdf(&path, 612, 792, vec![text(72, 700, 10, "Hi you")]);

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.page_count, 1);
        assert_eq!(doc.page_errors, 0);
        let glyphs = &doc.pages[0].glyphs;
        let text: String = glyphs.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(text, "Hi you");

        // Courier advances 6pt per glyph at 10pt.
        assert!((glyphs[0].bbox.x0 - 72.0).abs() < 1e-6);
        assert!((glyphs[1].bbox.x0 - 78.0).abs() < 1e-6);
        assert!((glyphs[0].bbox.y0 - 700.0).abs() < 1e-6);
        assert!((glyphs[0].bbox.height() - 10.0).abs() < 1e-6);
        assert!(glyphs.iter().all(|g| g.upright));
    }

    #[test]
    fn test_rulings_and_image_placement() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shapes.pdf");
        let mut ops = rect(100, 500, 200, 40);
        ops.extend(line(100, 520, 300, 520));
        ops.extend(place_image(10, 20, 100, 50));
        write_pdf(&path, 612, 792, vec![ops]);

        let doc = load_document(&path).unwrap();
        let page = &doc.pages[0];
        let horizontal = page
            .rulings
            .iter()
            .filter(|r| r.orientation == Orientation::Horizontal)
            .count();
        let vertical = page
            .rulings
            .iter()
            .filter(|r| r.orientation == Orientation::Vertical)
            .count();
        assert_eq!(horizontal, 3);
        assert_eq!(vertical, 2);
        assert_eq!(page.images.len(), 1);
        assert_eq!(page.images[0].name, "Im1");
        assert_eq!(page.images[0].bbox, BBox::new(10.0, 20.0, 110.0, 70.0));
    }

    #[test]
    fn test_media_box_and_info_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("info.pdf");
        write_pdf(&path, 200, 300, vec![vec![], vec![]]);

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.pages[1].number, 2);
        assert_eq!(doc.pages[0].media_box, BBox::new(0.0, 0.0, 200.0, 300.0));
        assert_eq!(doc.info.title.as_deref(), Some("Jane Doe Resume"));
        assert_eq!(doc.info.author, None);
        assert_eq!(doc.glyph_count(), 0);
    }

    #[test]
    fn test_images_are_placed_without_disturbing_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.pdf");
        let mut ops = place_image(400, 600, 120, 150);
        ops.extend(text(72, 700, 12, "Jane Doe"));
        write_pdf(&path, 612, 792, vec![ops]);

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.page_errors, 0);
        let page = &doc.pages[0];
        let text: String = page.glyphs.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(text, "Jane Doe");
        assert_eq!(page.images.len(), 1);
        assert_eq!(page.images[0].bbox, BBox::new(400.0, 600.0, 520.0, 750.0));
    }

    #[test]
    fn test_malformed_font_page_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_font.pdf");
        write_pages(
            &path,
            612,
            792,
            vec![
                FixturePage {
                    operations: text(72, 700, 12, "Broken"),
                    font: Some(malformed_font()),
                    ..FixturePage::default()
                },
                text(72, 700, 12, "Jane Doe").into(),
            ],
        );

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.page_errors, 1);
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].number, 2);
        let text: String = doc.pages[0].glyphs.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(text, "Jane Doe");
    }

    #[test]
    fn test_page_rotation_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotated.pdf");
        let page = |rotate: i64| FixturePage {
            rotate: Some(rotate),
            ..FixturePage::default()
        };
        write_pages(&path, 612, 792, vec![page(90), page(-90), page(450), page(45)]);

        let doc = load_document(&path).unwrap();
        let rotations: Vec<u16> = doc.pages.iter().map(|p| p.rotation).collect();
        assert_eq!(rotations, vec![90, 270, 90, 0]);
    }

    #[test]
    fn test_info_strings_decode_pdf_doc_encoding() {
        let literal = Object::String(vec![b'A', 0x84, b'B', 0x80, 0xE9], StringFormat::Literal);
        assert_eq!(text_string(&literal).as_deref(), Some("A\u{2014}B\u{2022}\u{e9}"));

        let utf16 = Object::String(vec![0xFE, 0xFF, 0x00, b'J', 0x20, 0x14], StringFormat::Hexadecimal);
        assert_eq!(text_string(&utf16).as_deref(), Some("J\u{2014}"));

        let blank = Object::string_literal("   ");
        assert_eq!(text_string(&blank), None);
    }

    #[test]
    fn test_validate_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        write_pdf(&path, 612, 792, vec![vec![]]);
        assert_eq!(validate_pdf(&path).unwrap(), 1);

        let txt = dir.path().join("resume.txt");
        std::fs::write(&txt, b"hello").unwrap();
        assert!(matches!(
            validate_pdf(&txt),
            Err(ExtractionError::InvalidDocument(_))
        ));
        assert!(matches!(
            validate_pdf(&dir.path().join("missing.pdf")),
            Err(ExtractionError::Io { .. })
        ));
    }
}
