//! Layout data types
//!
//! These types describe page geometry independently of how rasters are
//! produced or embedded.

use crate::types::Category;

/// How a raster is scaled into its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingMode {
    /// Preserve aspect ratio, centered in the cell
    Fit,
    /// Fill the whole cell (full bleed)
    Stretch,
}

/// How cell sizes are derived from the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSizing {
    /// Equal division of the usable page area
    Quadrants,
    /// Full usable width, height from the category's aspect ratio,
    /// stacked from the top
    FullWidthStack,
}

/// Per-category grid packing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingPolicy {
    pub cols: usize,
    pub rows: usize,
    pub sizing: CellSizing,
    pub scaling: ScalingMode,
}

impl PackingPolicy {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Smartphone | Category::Square => Self {
                cols: 2,
                rows: 2,
                sizing: CellSizing::Quadrants,
                scaling: ScalingMode::Fit,
            },
            Category::Rectangular => Self {
                cols: 1,
                rows: 4,
                sizing: CellSizing::FullWidthStack,
                scaling: ScalingMode::Stretch,
            },
        }
    }

    pub fn slots_per_page(&self) -> usize {
        self.cols * self.rows
    }
}

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rectangular area in points, PDF orientation (y grows upward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Straight line between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Geometry of one page's grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub cols: usize,
    pub rows: usize,
    pub cell_width_pt: f32,
    pub cell_height_pt: f32,
    /// Area covered by all cells together
    pub bounds: Rect,
}

impl GridLayout {
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Row-major grid position of slot `index`
    pub fn position_of(&self, index: usize) -> GridPosition {
        GridPosition::new(index / self.cols, index % self.cols)
    }
}

/// One slot on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PageCell {
    /// Index of the raster drawn here (None = blank)
    pub slot: Option<usize>,
    pub grid_pos: GridPosition,
    pub rect: Rect,
}

impl PageCell {
    pub fn is_blank(&self) -> bool {
        self.slot.is_none()
    }
}

/// Layout-resolved geometry of one output page
#[derive(Debug, Clone, PartialEq)]
pub struct PageDescriptor {
    pub category: Category,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub grid: GridLayout,
    pub scaling: ScalingMode,
    /// Every grid cell in row-major order, blanks included
    pub cells: Vec<PageCell>,
}

impl PageDescriptor {
    pub fn populated(&self) -> impl Iterator<Item = &PageCell> {
        self.cells.iter().filter(|cell| !cell.is_blank())
    }

    pub fn blank_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_blank()).count()
    }
}
