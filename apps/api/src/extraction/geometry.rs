//! Page-space primitives shared by the page collector, layout grouping and table finder.
//!
//! Coordinates are PDF user space: origin bottom-left, y grows upward, units are points.

use serde::{Deserialize, Serialize};

/// Affine transform in PDF notation `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// `self` applied first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Bounding box of the transformed unit square (image space).
    pub fn unit_square_bounds(&self) -> BBox {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ];
        BBox::enclosing(&corners)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn enclosing(points: &[(f64, f64)]) -> Self {
        let mut bbox = BBox {
            x0: f64::INFINITY,
            y0: f64::INFINITY,
            x1: f64::NEG_INFINITY,
            y1: f64::NEG_INFINITY,
        };
        for &(x, y) in points {
            bbox.x0 = bbox.x0.min(x);
            bbox.y0 = bbox.y0.min(y);
            bbox.x1 = bbox.x1.max(x);
            bbox.y1 = bbox.y1.max(y);
        }
        bbox
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Signed vertical overlap; negative when the boxes are vertically apart.
    pub fn v_overlap(&self, other: &BBox) -> f64 {
        self.y1.min(other.y1) - self.y0.max(other.y0)
    }

    /// Signed horizontal overlap; negative when the boxes are horizontally apart.
    pub fn h_overlap(&self, other: &BBox) -> f64 {
        self.x1.min(other.x1) - self.x0.max(other.x0)
    }

    /// Horizontal gap between the boxes, 0 when they overlap.
    pub fn h_distance(&self, other: &BBox) -> f64 {
        (-self.h_overlap(other)).max(0.0)
    }

    /// Vertical gap between the boxes, 0 when they overlap.
    pub fn v_distance(&self, other: &BBox) -> f64 {
        (-self.v_overlap(other)).max(0.0)
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// One decoded character with its page-space box.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: String,
    pub bbox: BBox,
    /// True when the text baseline runs along the page x axis.
    pub upright: bool,
}

impl Glyph {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned line segment painted on the page.
///
/// Horizontal: `position` is y, `start..end` spans x. Vertical: `position` is x, span is y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruling {
    pub orientation: Orientation,
    pub position: f64,
    pub start: f64,
    pub end: f64,
}

impl Ruling {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Where an image XObject is drawn on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub name: String,
    pub bbox: BBox,
}

/// Everything recovered from one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub number: u32,
    pub media_box: BBox,
    /// Clockwise display rotation in degrees: 0, 90, 180 or 270.
    pub rotation: u16,
    pub glyphs: Vec<Glyph>,
    pub rulings: Vec<Ruling>,
    pub images: Vec<ImagePlacement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_then_scale() {
        let m = Matrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 5.0).then(&Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0));
        assert_eq!(m.apply(0.0, 0.0), (20.0, 10.0));
        assert_eq!(m.apply(1.0, 1.0), (22.0, 12.0));
    }

    #[test]
    fn test_unit_square_bounds_of_image_matrix() {
        let m = Matrix::new(100.0, 0.0, 0.0, 50.0, 10.0, 20.0);
        assert_eq!(m.unit_square_bounds(), BBox::new(10.0, 20.0, 110.0, 70.0));
    }

    #[test]
    fn test_overlap_and_distance() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(14.0, 5.0, 20.0, 15.0);
        assert_eq!(a.h_distance(&b), 4.0);
        assert_eq!(a.v_overlap(&b), 5.0);
        assert_eq!(a.v_distance(&b), 0.0);
    }
}
