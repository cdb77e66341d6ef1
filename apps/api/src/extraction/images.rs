//! Embedded image recovery: render the page, crop each image placement, re-encode as PNG.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::ImageFormat;
use tracing::{debug, warn};

use crate::extraction::error::ExtractionError;
use crate::extraction::geometry::{BBox, PageLayout};
use crate::extraction::raster::Rasterizer;

pub fn to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Crops every image placement of `page` out of the rendered page `png`.
///
/// Placements are clipped to the media box and turned with the page's `/Rotate`, since
/// renderers output the page as displayed. Ones that end up smaller than a pixel are
/// skipped, as are ones that fail to encode.
pub fn crop_placements(png: &[u8], page: &PageLayout) -> Result<Vec<String>, ExtractionError> {
    let rendered = image::load_from_memory(png)?;
    let media = page.media_box;
    if media.width() <= 0.0 || media.height() <= 0.0 {
        return Ok(Vec::new());
    }
    let (shown_width, shown_height) = match page.rotation {
        90 | 270 => (media.height(), media.width()),
        _ => (media.width(), media.height()),
    };
    let sx = f64::from(rendered.width()) / shown_width;
    let sy = f64::from(rendered.height()) / shown_height;

    let mut crops = Vec::new();
    for placement in &page.images {
        let Some(clipped) = clip(&placement.bbox, &media) else {
            debug!(image = %placement.name, "Image placement lies outside the page");
            continue;
        };
        let area = displayed_area(&clipped, &media, page.rotation);
        let x = (area.x0 * sx).round().max(0.0) as u32;
        let y = (area.y0 * sy).round().max(0.0) as u32;
        let w = ((area.width() * sx).round() as u32).min(rendered.width().saturating_sub(x));
        let h = ((area.height() * sy).round() as u32).min(rendered.height().saturating_sub(y));
        if w == 0 || h == 0 {
            continue;
        }

        let mut out = Cursor::new(Vec::new());
        match rendered.crop_imm(x, y, w, h).write_to(&mut out, ImageFormat::Png) {
            Ok(()) => crops.push(to_base64(out.get_ref())),
            Err(e) => warn!(image = %placement.name, error = %e, "Failed to encode cropped image"),
        }
    }
    Ok(crops)
}

/// Maps a page-space box to the displayed page, in points from its top-left corner.
fn displayed_area(bbox: &BBox, media: &BBox, rotation: u16) -> BBox {
    let (w, h) = (media.width(), media.height());
    let (u0, u1) = (bbox.x0 - media.x0, bbox.x1 - media.x0);
    let (v0, v1) = (media.y1 - bbox.y1, media.y1 - bbox.y0);
    match rotation {
        90 => BBox::new(h - v1, u0, h - v0, u1),
        180 => BBox::new(w - u1, h - v1, w - u0, h - v0),
        270 => BBox::new(v0, w - u1, v1, w - u0),
        _ => BBox::new(u0, v0, u1, v1),
    }
}

/// Renders each page that places images and collects the cropped PNGs, in page order.
pub fn extract_images(
    pdf: &Path,
    pages: &[PageLayout],
    rasterizer: &dyn Rasterizer,
    dpi: u32,
) -> Vec<String> {
    let mut images = Vec::new();
    for page in pages.iter().filter(|p| !p.images.is_empty()) {
        let png = match rasterizer.render_page(pdf, page.number, dpi) {
            Ok(png) => png,
            Err(e) => {
                warn!(page = page.number, error = %e, "Failed to render page for image extraction");
                continue;
            }
        };
        match crop_placements(&png, page) {
            Ok(crops) => images.extend(crops),
            Err(e) => warn!(page = page.number, error = %e, "Failed to crop page images"),
        }
    }
    images
}

fn clip(bbox: &BBox, media: &BBox) -> Option<BBox> {
    let clipped = BBox {
        x0: bbox.x0.max(media.x0),
        y0: bbox.y0.max(media.y0),
        x1: bbox.x1.min(media.x1),
        y1: bbox.y1.min(media.y1),
    };
    (clipped.width() > 0.0 && clipped.height() > 0.0).then_some(clipped)
}
