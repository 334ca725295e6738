//! Pagination statistics

use crate::layout::{group_by_category, plan_pages};
use crate::options::LayoutOptions;
use crate::types::{Category, ExportStatistics};

/// Work out how a selection with these categories will paginate
pub fn calculate_statistics(categories: &[Category]) -> ExportStatistics {
    let pages = plan_pages(categories, &LayoutOptions::default());

    ExportStatistics {
        instances: categories.len(),
        pages: pages.len(),
        blank_cells: pages.iter().map(|page| page.blank_count()).sum(),
        per_category: group_by_category(categories)
            .into_iter()
            .map(|(category, indices)| (category, indices.len()))
            .collect(),
    }
}
