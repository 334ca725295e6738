//! Conversion between editor (display) space and source-pixel space
//!
//! Stored coordinates are always source pixels. The per-category view scale
//! is applied only when drawing the editor and when a drag ends.

use crate::types::{Category, InstanceId};

/// Scale from source pixels to display pixels for a category
pub fn scale_factor(category: Category) -> f32 {
    category.view_scale()
}

/// Source pixel coordinate → display coordinate
pub fn to_display(source: i32, category: Category) -> f32 {
    source as f32 * scale_factor(category)
}

/// Display coordinate → nearest source pixel coordinate
pub fn to_source(display: f32, category: Category) -> i32 {
    (display / scale_factor(category)).round() as i32
}

/// Movement reported by the editor when a drag stops, in display pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayDelta {
    pub dx: f32,
    pub dy: f32,
}

impl DisplayDelta {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// Source-space movement of one field, ready to be applied to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
    pub instance: InstanceId,
    pub field: String,
    pub dx: i32,
    pub dy: i32,
}

/// Turn a finished drag into a source-space position update.
///
/// Pure: depends only on its arguments, never on editor state.
pub fn drag_update(
    instance: InstanceId,
    field: &str,
    delta: DisplayDelta,
    category: Category,
) -> PositionUpdate {
    PositionUpdate {
        instance,
        field: field.to_string(),
        dx: to_source(delta.dx, category),
        dy: to_source(delta.dy, category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_within_one_pixel() {
        for category in Category::ALL {
            let (w, h) = category.source_size();
            for c in (-200..(w.max(h) as i32 + 200)).step_by(7) {
                let back = to_source(to_display(c, category), category);
                assert!((back - c).abs() <= 1, "{} drifted to {} for {}", c, back, category);
            }
        }
    }

    #[test]
    fn test_to_display_uses_table() {
        assert_eq!(to_display(100, Category::Square), 50.0);
        assert_eq!(to_display(1000, Category::Smartphone), 400.0);
    }

    #[test]
    fn test_to_source_rounds() {
        // 10.3 / 0.4 = 25.75
        assert_eq!(to_source(10.3, Category::Smartphone), 26);
        assert_eq!(to_source(-3.0, Category::Rectangular), -5);
    }

    #[test]
    fn test_drag_update_converts_delta() {
        let id = InstanceId(42);
        let update = drag_update(id, "Price", DisplayDelta::new(12.0, -6.0), Category::Rectangular);
        assert_eq!(update.instance, id);
        assert_eq!(update.field, "Price");
        assert_eq!(update.dx, 20);
        assert_eq!(update.dy, -10);
    }
}
