//! Layout calculation modules for pagination
//!
//! This module handles all the geometric calculations for the output pages:
//! - Grid layout (cell dimensions, cut guide positions)
//! - Page planning (which raster goes into which cell)
//! - Raster placement within a cell (scaling)

mod grid;
mod placement;
mod planner;
mod types;

pub use grid::*;
pub use placement::*;
pub use planner::*;
pub use types::*;
