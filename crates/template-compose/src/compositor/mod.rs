//! Overlay compositing
//!
//! Produces one flat raster per template instance, always at the category's
//! intrinsic resolution:
//! 1. Decode the base asset (or substitute the placeholder)
//! 2. Bring it to the intrinsic size
//! 3. Draw every visible field at its source-pixel position

mod text;

pub use text::draw_text;

use crate::constants::{PLACEHOLDER_BORDER, PLACEHOLDER_BORDER_PX, PLACEHOLDER_FILL};
use crate::fields::EffectiveField;
use crate::fonts::ResolvedFace;
use crate::types::{Category, Result};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

/// A resolved field together with the face it will be drawn with.
///
/// `face` is `None` only when not even a fallback face exists; such
/// fields are skipped.
#[derive(Debug, Clone)]
pub struct FieldRender {
    pub field: EffectiveField,
    pub face: Option<ResolvedFace>,
}

/// Decode encoded asset bytes and bring them to the category's intrinsic size
pub fn decode_base(bytes: &[u8], category: Category) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    Ok(fit_to_source(decoded, category))
}

/// Resize `img` to the intrinsic resolution if it differs
pub fn fit_to_source(img: RgbaImage, category: Category) -> RgbaImage {
    let (w, h) = category.source_size();
    if img.dimensions() == (w, h) {
        return img;
    }
    log::debug!(
        "Resizing {} asset from {}x{} to {}x{}",
        category,
        img.width(),
        img.height(),
        w,
        h
    );
    image::imageops::resize(&img, w, h, FilterType::Triangle)
}

/// Fixed raster substituted for an asset that could not be loaded
pub fn placeholder(category: Category) -> RgbaImage {
    let (w, h) = category.source_size();
    let border = PLACEHOLDER_BORDER_PX;
    RgbaImage::from_fn(w, h, |x, y| {
        let on_border = x < border || y < border || x >= w - border || y >= h - border;
        if on_border {
            Rgba(PLACEHOLDER_BORDER)
        } else {
            Rgba(PLACEHOLDER_FILL)
        }
    })
}

/// Draw every visible field onto the base raster
pub fn compose_instance(base: RgbaImage, category: Category, fields: &[FieldRender]) -> RgbaImage {
    let mut img = fit_to_source(base, category);

    for render in fields.iter().filter(|r| r.field.is_visible()) {
        let field = &render.field;
        match &render.face {
            Some(face) => draw_text(
                &mut img,
                face,
                field.font_size,
                field.x,
                field.y,
                field.color,
                &field.text,
            ),
            None => log::warn!("No font face available, skipping field '{}'", field.name),
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldCustomization, definition};

    #[test]
    fn test_placeholder_has_intrinsic_size() {
        for category in Category::ALL {
            assert_eq!(placeholder(category).dimensions(), category.source_size());
        }
    }

    #[test]
    fn test_placeholder_border_and_fill() {
        let img = placeholder(Category::Square);
        assert_eq!(img.get_pixel(0, 0).0, PLACEHOLDER_BORDER);
        assert_eq!(img.get_pixel(540, 540).0, PLACEHOLDER_FILL);
    }

    #[test]
    fn test_compose_resizes_small_base() {
        let base = RgbaImage::from_pixel(30, 10, Rgba([10, 20, 30, 255]));
        let out = compose_instance(base, Category::Rectangular, &[]);
        assert_eq!(out.dimensions(), (1500, 500));
        assert_eq!(out.get_pixel(750, 250).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_field_without_face_is_skipped() {
        let def = definition(Category::Square, "Model").unwrap();
        let field = FieldCustomization {
            text: Some("ThinkPad".into()),
            ..Default::default()
        }
        .resolve(def);
        let base = placeholder(Category::Square);
        let out = compose_instance(base.clone(), Category::Square, &[FieldRender { field, face: None }]);
        assert_eq!(out, base);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_base(b"not an image", Category::Square).is_err());
    }
}
