//! Grid layout calculation
//!
//! This module handles the geometry of the cell grid on a page: cell
//! dimensions, cell bounds and the internal boundaries used as cut guides.

use crate::types::Category;

use super::{CellSizing, GridLayout, GridPosition, PackingPolicy, Rect, Segment};

// =============================================================================
// Grid Creation
// =============================================================================

/// Create the grid for a category on a page.
///
/// # Arguments
/// * `category` - Category whose packing policy and aspect ratio apply
/// * `page_width_pt` - Page width in points
/// * `page_height_pt` - Page height in points
/// * `margin_pt` - Uniform margin around the usable area
pub fn create_grid_layout(
    category: Category,
    page_width_pt: f32,
    page_height_pt: f32,
    margin_pt: f32,
) -> GridLayout {
    let policy = PackingPolicy::for_category(category);
    let usable = Rect::new(
        margin_pt,
        margin_pt,
        page_width_pt - 2.0 * margin_pt,
        page_height_pt - 2.0 * margin_pt,
    );

    match policy.sizing {
        CellSizing::Quadrants => GridLayout {
            cols: policy.cols,
            rows: policy.rows,
            cell_width_pt: usable.width / policy.cols as f32,
            cell_height_pt: usable.height / policy.rows as f32,
            bounds: usable,
        },
        CellSizing::FullWidthStack => {
            let aspect = category.aspect_ratio();
            let mut cell_width = usable.width;
            let mut cell_height = cell_width * aspect;

            // Clamp so the stack never runs off the page, keeping the aspect ratio
            let max_height = usable.height / policy.rows as f32;
            if cell_height > max_height {
                cell_height = max_height;
                cell_width = cell_height / aspect;
            }

            let grid_width = cell_width * policy.cols as f32;
            let grid_height = cell_height * policy.rows as f32;
            GridLayout {
                cols: policy.cols,
                rows: policy.rows,
                cell_width_pt: cell_width,
                cell_height_pt: cell_height,
                bounds: Rect::new(
                    usable.center_x() - grid_width / 2.0,
                    usable.top() - grid_height,
                    grid_width,
                    grid_height,
                ),
            }
        }
    }
}

// =============================================================================
// Cell Calculations
// =============================================================================

/// Calculate the bounds of a cell at the given grid position.
///
/// Row 0 is the top row, so y is inverted relative to the row index.
pub fn cell_bounds(grid: &GridLayout, pos: GridPosition) -> Rect {
    let cell_x = grid.bounds.x + pos.col as f32 * grid.cell_width_pt;
    let cell_y = grid.bounds.y + (grid.rows - pos.row - 1) as f32 * grid.cell_height_pt;

    Rect::new(cell_x, cell_y, grid.cell_width_pt, grid.cell_height_pt)
}

/// Lines along every boundary shared by two cells
pub fn internal_boundaries(grid: &GridLayout) -> Vec<Segment> {
    let b = &grid.bounds;
    let vertical = (1..grid.cols).map(|col| {
        let x = b.x + col as f32 * grid.cell_width_pt;
        Segment {
            x1: x,
            y1: b.y,
            x2: x,
            y2: b.top(),
        }
    });
    let horizontal = (1..grid.rows).map(|row| {
        let y = b.y + row as f32 * grid.cell_height_pt;
        Segment {
            x1: b.x,
            y1: y,
            x2: b.right(),
            y2: y,
        }
    });
    vertical.chain(horizontal).collect()
}

// =============================================================================
// Tests
// =============================================================================
