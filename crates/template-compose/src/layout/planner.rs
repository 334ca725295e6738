//! Page planning
//!
//! Groups rasters by category and packs each run into pages. Categories
//! appear in the order they first occur in the input; within a category
//! the input order is kept.

use crate::constants::{A4_HEIGHT_PT, A4_WIDTH_PT};
use crate::options::LayoutOptions;
use crate::types::Category;

use super::{PackingPolicy, PageCell, PageDescriptor, cell_bounds, create_grid_layout};

/// Indices of `categories`, grouped per category in order of first appearance
pub fn group_by_category(categories: &[Category]) -> Vec<(Category, Vec<usize>)> {
    let mut runs: Vec<(Category, Vec<usize>)> = Vec::new();
    for (index, &category) in categories.iter().enumerate() {
        match runs.iter_mut().find(|(c, _)| *c == category) {
            Some((_, indices)) => indices.push(index),
            None => runs.push((category, vec![index])),
        }
    }
    runs
}

/// Plan the output pages for rasters of the given categories.
///
/// `categories[i]` is the category of raster `i`; each populated cell's
/// `slot` refers back to that index.
pub fn plan_pages(categories: &[Category], options: &LayoutOptions) -> Vec<PageDescriptor> {
    let mut pages = Vec::new();

    for (category, indices) in group_by_category(categories) {
        let policy = PackingPolicy::for_category(category);
        let grid = create_grid_layout(
            category,
            A4_WIDTH_PT,
            A4_HEIGHT_PT,
            options.page_margin_pt,
        );

        for chunk in indices.chunks(policy.slots_per_page()) {
            let cells = (0..grid.cell_count())
                .map(|cell_index| {
                    let grid_pos = grid.position_of(cell_index);
                    PageCell {
                        slot: chunk.get(cell_index).copied(),
                        grid_pos,
                        rect: cell_bounds(&grid, grid_pos),
                    }
                })
                .collect();

            pages.push(PageDescriptor {
                category,
                page_width_pt: A4_WIDTH_PT,
                page_height_pt: A4_HEIGHT_PT,
                grid: grid.clone(),
                scaling: policy.scaling,
                cells,
            });
        }
    }

    log::debug!(
        "Planned {} page(s) for {} raster(s)",
        pages.len(),
        categories.len()
    );
    pages
}
