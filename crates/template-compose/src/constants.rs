//! Shared constants for template composition
//!
//! This module centralizes magic numbers used by the compositor, the layout
//! planner and the page assembler.

// =============================================================================
// Categories
// =============================================================================

/// Intrinsic resolution of smartphone templates (width, height) in pixels
pub const SMARTPHONE_SOURCE_SIZE: (u32, u32) = (1375, 1044);

/// Intrinsic resolution of square templates
pub const SQUARE_SOURCE_SIZE: (u32, u32) = (1080, 1080);

/// Intrinsic resolution of rectangular templates
pub const RECTANGULAR_SOURCE_SIZE: (u32, u32) = (1500, 500);

/// Editor view scale for smartphone templates
pub const SMARTPHONE_VIEW_SCALE: f32 = 0.4;

/// Editor view scale for square templates
pub const SQUARE_VIEW_SCALE: f32 = 0.5;

/// Editor view scale for rectangular templates
pub const RECTANGULAR_VIEW_SCALE: f32 = 0.6;

// =============================================================================
// Output Page
// =============================================================================

/// ISO A4 width in points
pub const A4_WIDTH_PT: f32 = 595.28;

/// ISO A4 height in points
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Default width of the cut guides drawn between cells (points)
pub const SEPARATOR_LINE_WIDTH: f32 = 0.5;

/// Gray level of cut guides (0 = black, 1 = white)
pub const SEPARATOR_GRAY: f32 = 0.6;

/// Slots on every page, whatever the category
pub const SLOTS_PER_PAGE: usize = 4;

// =============================================================================
// Text
// =============================================================================

/// Family used when a field has no explicit font family
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";

/// Horizontal shear applied when italics are synthesized
pub const SYNTHETIC_ITALIC_SHEAR: f32 = 0.2;

/// Font size divided by this gives the stroke offset for synthetic bold
pub const SYNTHETIC_BOLD_DIVISOR: f32 = 36.0;

// =============================================================================
// Placeholder
// =============================================================================

/// Fill of the raster substituted for an asset that failed to load
pub const PLACEHOLDER_FILL: [u8; 4] = [230, 230, 230, 255];

/// Border of the placeholder raster
pub const PLACEHOLDER_BORDER: [u8; 4] = [150, 150, 150, 255];

/// Border thickness of the placeholder raster, in pixels
pub const PLACEHOLDER_BORDER_PX: u32 = 6;

// =============================================================================
// Export
// =============================================================================

/// Default bounded wait for a font family to become ready (milliseconds)
pub const DEFAULT_FONT_WAIT_MS: u64 = 1500;

/// Default number of instances composed at the same time
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
