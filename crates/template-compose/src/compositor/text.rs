//! Glyph rasterization onto RGBA buffers

use crate::constants::{SYNTHETIC_BOLD_DIVISOR, SYNTHETIC_ITALIC_SHEAR};
use crate::fonts::ResolvedFace;
use crate::types::Rgb;
use image::RgbaImage;
use rusttype::{Font, Scale, point};

/// Draw one line of text with its top-left corner at `(x, y)`.
///
/// Glyphs are alpha-blended over the existing pixels. Synthetic bold
/// overstrikes the run a few pixels to the right; synthetic italic shears
/// each glyph around the baseline.
pub fn draw_text(
    img: &mut RgbaImage,
    face: &ResolvedFace,
    px: f32,
    x: i32,
    y: i32,
    color: Rgb,
    text: &str,
) {
    if !px.is_finite() || px <= 0.0 {
        log::warn!("Skipping text drawn at invalid size {}", px);
        return;
    }
    let strokes = if face.synthetic_bold {
        (px / SYNTHETIC_BOLD_DIVISOR).ceil().max(1.0) as i32
    } else {
        0
    };
    let shear = if face.synthetic_italic {
        SYNTHETIC_ITALIC_SHEAR
    } else {
        0.0
    };

    for offset in 0..=strokes {
        draw_run(img, &face.font, px, x + offset, y, color, text, shear);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_run(
    img: &mut RgbaImage,
    font: &Font<'static>,
    px: f32,
    x: i32,
    y: i32,
    color: Rgb,
    text: &str,
    shear: f32,
) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let baseline_y = y as f32 + v_metrics.ascent;

    for glyph in font.layout(text, scale, point(x as f32, baseline_y)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let py = gy as i32 + bb.min.y;
            let skew = ((baseline_y - py as f32) * shear).round() as i32;
            let tx = gx as i32 + bb.min.x + skew;
            blend(img, tx, py, color, coverage);
        });
    }
}

fn blend(img: &mut RgbaImage, x: i32, y: i32, color: Rgb, coverage: f32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= img.width() || y >= img.height() {
        return;
    }
    let a = coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    let dst = img.get_pixel_mut(x, y);
    dst.0[0] = (color.r as f32 * a + dst.0[0] as f32 * inv) as u8;
    dst.0[1] = (color.g as f32 * a + dst.0[1] as f32 * inv) as u8;
    dst.0[2] = (color.b as f32 * a + dst.0[2] as f32 * inv) as u8;
    dst.0[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_blend_clips_outside_pixels() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        blend(&mut img, -1, 0, Rgb::BLACK, 1.0);
        blend(&mut img, 2, 1, Rgb::BLACK, 1.0);
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_blend_mixes_by_coverage() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        blend(&mut img, 0, 0, Rgb::BLACK, 0.5);
        let p = img.get_pixel(0, 0);
        assert_eq!(p.0[0], 127);
        assert_eq!(p.0[3], 255);
    }
}
