//! Raster placement within cells

use super::{Rect, ScalingMode};

/// Calculate the scale factor from source size to target size.
pub fn calculate_scale(
    source_width: f32,
    source_height: f32,
    target_width: f32,
    target_height: f32,
    mode: ScalingMode,
) -> f32 {
    match mode {
        ScalingMode::Fit => {
            let scale_x = target_width / source_width;
            let scale_y = target_height / source_height;
            scale_x.min(scale_y)
        }
        ScalingMode::Stretch => target_width / source_width,
    }
}

/// Rectangle a `width`×`height` raster occupies inside `cell`.
///
/// Fit keeps the aspect ratio and centers the raster; Stretch covers the
/// whole cell.
pub fn place_raster(cell: &Rect, width: u32, height: u32, mode: ScalingMode) -> Rect {
    if width == 0 || height == 0 {
        return Rect::new(cell.center_x(), cell.center_y(), 0.0, 0.0);
    }
    match mode {
        ScalingMode::Stretch => *cell,
        ScalingMode::Fit => {
            let scale = calculate_scale(
                width as f32,
                height as f32,
                cell.width,
                cell.height,
                mode,
            );
            let w = width as f32 * scale;
            let h = height as f32 * scale;
            Rect::new(cell.center_x() - w / 2.0, cell.center_y() - h / 2.0, w, h)
        }
    }
}
