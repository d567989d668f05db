use image::{Rgba, RgbaImage};

use crate::blocks::Primitive;
use crate::error::Result;
use crate::fonts::{FaceSet, FontSpec};
use crate::pdf::visual::ComposedPage;
use crate::style::Color;

pub const DEFAULT_SCALE: f32 = 3.0;

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Pixel size of a page rendered at `scale` pixels per point.
pub fn raster_size(width_pt: f32, height_pt: f32, scale: f32) -> (u32, u32) {
    (
        (width_pt * scale).ceil().max(1.0) as u32,
        (height_pt * scale).ceil().max(1.0) as u32,
    )
}

/// Draws one composed page on white paper at `scale` pixels per point.
pub fn rasterize(page: &ComposedPage, faces: &FaceSet, scale: f32) -> Result<RgbaImage> {
    let (w, h) = raster_size(page.width, page.height, scale);
    let mut img = RgbaImage::from_pixel(w, h, PAPER);

    for primitive in &page.primitives {
        match primitive {
            Primitive::Rect {
                x,
                y,
                width,
                height,
                color,
            } => fill_rect(
                &mut img,
                *x * scale,
                *y * scale,
                *width * scale,
                *height * scale,
                *color,
            ),
            Primitive::Text {
                x,
                baseline,
                text,
                font,
                color,
            } => {
                let scaled = FontSpec {
                    size: font.size * scale,
                    ..*font
                };
                for glyph in faces.layout(text, scaled, *x * scale, *baseline * scale)? {
                    let Some(bb) = glyph.pixel_bounding_box() else {
                        continue;
                    };
                    glyph.draw(|gx, gy, coverage| {
                        let px = bb.min.x + gx as i32;
                        let py = bb.min.y + gy as i32;
                        if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                            blend(&mut img, px as u32, py as u32, *color, coverage);
                        }
                    });
                }
            }
        }
    }
    Ok(img)
}

fn blend(img: &mut RgbaImage, x: u32, y: u32, color: Color, coverage: f32) {
    let bg = *img.get_pixel(x, y);
    let mut out = bg;
    for i in 0..3 {
        out[i] = (color[i] as f32 * coverage + bg[i] as f32 * (1.0 - coverage)).round() as u8;
    }
    out[3] = 255;
    img.put_pixel(x, y, out);
}

/// Fills a rectangle given in pixels. Hairlines still cover one pixel row.
fn fill_rect(img: &mut RgbaImage, x: f32, y: f32, width: f32, height: f32, color: Color) {
    let (w, h) = img.dimensions();
    let x0 = x.round().max(0.0) as u32;
    let y0 = y.round().max(0.0) as u32;
    let x1 = ((x + width).round().max(0.0) as u32).max(x0 + 1).min(w);
    let y1 = ((y + height).round().max(0.0) as u32).max(y0 + 1).min(h);
    let fill = Rgba([color[0], color[1], color[2], 255]);
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, fill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_at_default_scale() {
        assert_eq!(raster_size(595.28, 841.89, DEFAULT_SCALE), (1786, 2526));
    }

    #[test]
    fn hairline_rule_covers_a_row() {
        let mut img = RgbaImage::from_pixel(10, 10, PAPER);
        fill_rect(&mut img, 1.0, 4.2, 5.0, 0.1, [0, 0, 0]);
        assert_eq!(img.get_pixel(2, 4).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(2, 5).0, PAPER.0);
        assert_eq!(img.get_pixel(7, 4).0, PAPER.0);
    }
}
