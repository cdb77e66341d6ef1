//! Layout-aware grouping of positioned glyphs into words, lines and blocks.
//!
//! Glyphs join a line when they overlap vertically by `line_overlap` of the smaller
//! height and sit within `char_margin` glyph widths of each other. A space is inserted
//! when the gap exceeds `word_margin` of the glyph size. Lines whose vertical gap is at
//! most `line_margin` of their height and that overlap horizontally form a block.

use crate::extraction::geometry::{BBox, Glyph, PageLayout};
use crate::extraction::settings::LayoutParams;

#[derive(Debug, Clone)]
struct TextLine {
    bbox: BBox,
    last: BBox,
    text: String,
    vertical: bool,
}

impl TextLine {
    fn start(glyph: &Glyph, vertical: bool) -> Self {
        Self {
            bbox: glyph.bbox,
            last: glyph.bbox,
            text: glyph.text.clone(),
            vertical,
        }
    }

    /// Whether `glyph` continues this line.
    fn accepts(&self, glyph: &Glyph, params: &LayoutParams) -> bool {
        let (prev, next) = (&self.last, &glyph.bbox);
        if self.vertical {
            prev.h_overlap(next) > params.line_overlap * prev.width().min(next.width())
                && prev.v_distance(next) < params.char_margin * prev.height().max(next.height())
        } else {
            prev.v_overlap(next) > params.line_overlap * prev.height().min(next.height())
                && prev.h_distance(next) < params.char_margin * prev.width().max(next.width())
        }
    }

    fn push(&mut self, glyph: &Glyph, params: &LayoutParams) {
        let next = &glyph.bbox;
        let gap = if self.vertical {
            self.last.y0 - next.y1
        } else {
            next.x0 - self.last.x1
        };
        if gap > params.word_margin * next.width().max(next.height()) {
            self.text.push(' ');
        }
        self.text.push_str(&glyph.text);
        self.bbox = self.bbox.union(next);
        self.last = *next;
    }
}

fn build_lines(glyphs: &[&Glyph], vertical: bool, params: &LayoutParams) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    for glyph in glyphs {
        match lines.last_mut() {
            Some(line) if line.accepts(glyph, params) => line.push(glyph, params),
            _ => lines.push(TextLine::start(glyph, vertical)),
        }
    }
    lines
}

fn same_block(a: &TextLine, b: &TextLine, params: &LayoutParams) -> bool {
    if a.vertical != b.vertical {
        return false;
    }
    if a.vertical {
        a.bbox.v_overlap(&b.bbox) > 0.0
            && a.bbox.h_distance(&b.bbox) <= params.line_margin * a.bbox.width().max(b.bbox.width())
    } else {
        a.bbox.h_overlap(&b.bbox) > 0.0
            && a.bbox.v_distance(&b.bbox)
                <= params.line_margin * a.bbox.height().max(b.bbox.height())
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Reading order: top edge descending, then left edge ascending.
fn reading_order(a: &BBox, b: &BBox) -> std::cmp::Ordering {
    b.y1.total_cmp(&a.y1).then(a.x0.total_cmp(&b.x0))
}

/// Text of one page: lines separated by newlines, blocks by a blank line.
pub fn page_text(glyphs: &[Glyph], params: &LayoutParams) -> String {
    let visible: Vec<&Glyph> = glyphs.iter().filter(|g| !g.is_blank()).collect();
    let (horizontal, vertical): (Vec<&Glyph>, Vec<&Glyph>) = visible
        .into_iter()
        .partition(|g| g.upright || !params.detect_vertical);

    let mut lines = build_lines(&horizontal, false, params);
    lines.extend(build_lines(&vertical, true, params));
    if lines.is_empty() {
        return String::new();
    }

    let mut parent: Vec<usize> = (0..lines.len()).collect();
    for i in 0..lines.len() {
        for j in (i + 1)..lines.len() {
            if same_block(&lines[i], &lines[j], params) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }
    }

    let mut blocks: Vec<(BBox, Vec<&TextLine>)> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let root = find(&mut parent, i);
        match roots.iter().position(|r| *r == root) {
            Some(k) => {
                blocks[k].0 = blocks[k].0.union(&line.bbox);
                blocks[k].1.push(line);
            }
            None => {
                roots.push(root);
                blocks.push((line.bbox, vec![line]));
            }
        }
    }
    blocks.sort_by(|a, b| reading_order(&a.0, &b.0));

    blocks
        .into_iter()
        .map(|(_, mut block_lines)| {
            if block_lines.first().map(|l| l.vertical).unwrap_or(false) {
                block_lines.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            } else {
                block_lines.sort_by(|a, b| reading_order(&a.bbox, &b.bbox));
            }
            block_lines
                .iter()
                .map(|l| l.text.trim_end())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Text of every page, separated by a blank line. Pages without text are skipped.
pub fn document_text(pages: &[PageLayout], params: &LayoutParams) -> String {
    pages
        .iter()
        .map(|p| page_text(&p.glyphs, params))
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Whitespace-collapsed text of the glyphs whose centre lies inside `area`.
pub fn text_within(glyphs: &[Glyph], area: &BBox, params: &LayoutParams) -> String {
    let inside: Vec<Glyph> = glyphs
        .iter()
        .filter(|g| {
            let (x, y) = g.bbox.center();
            area.contains_point(x, y)
        })
        .cloned()
        .collect();
    page_text(&inside, params)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
