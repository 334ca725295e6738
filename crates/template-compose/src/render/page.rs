//! Output page rendering

use crate::constants::SEPARATOR_GRAY;
use crate::layout::{PageDescriptor, Rect, Segment, internal_boundaries, place_raster};
use image::RgbaImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::encode_raster;

// =============================================================================
// Public API
// =============================================================================

/// Result of rendering one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedPage {
    pub page_id: ObjectId,
    /// Populated cells left blank because their raster could not be encoded
    pub encoding_failures: usize,
}

/// Render one output page.
///
/// # Arguments
/// * `output` - The output document
/// * `page` - Layout of this page
/// * `rasters` - Every composed raster; cells refer to them by index
/// * `parent_pages_id` - The parent Pages object ID
/// * `separator_width_pt` - Width of the cut guides (0 = none)
pub fn render_page(
    output: &mut Document,
    page: &PageDescriptor,
    rasters: &[RgbaImage],
    parent_pages_id: ObjectId,
    separator_width_pt: f32,
) -> RenderedPage {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(page.page_width_pt),
            Object::Real(page.page_height_pt),
        ]),
    );

    let mut content_ops = Vec::new();
    let mut xobjects = Dictionary::new();
    let mut encoding_failures = 0;

    for (idx, cell) in page.cells.iter().enumerate() {
        let Some(slot) = cell.slot else {
            continue;
        };
        let Some(raster) = rasters.get(slot) else {
            log::warn!("Page cell refers to missing raster {}", slot);
            encoding_failures += 1;
            continue;
        };

        match encode_raster(raster) {
            Ok(stream) => {
                let xobject_name = format!("Im{}", idx);
                let xobject_id = output.add_object(stream);
                xobjects.set(xobject_name.as_bytes(), Object::Reference(xobject_id));

                let placed = place_raster(&cell.rect, raster.width(), raster.height(), page.scaling);
                content_ops.push(generate_placement_command(&xobject_name, &placed));
            }
            Err(e) => {
                log::warn!("Leaving cell {} blank: {}", idx, e);
                encoding_failures += 1;
            }
        }
    }

    if separator_width_pt > 0.0 {
        content_ops.push(generate_separators(
            &internal_boundaries(&page.grid),
            separator_width_pt,
        ));
    }

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    RenderedPage {
        page_id: output.add_object(page_dict),
        encoding_failures,
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Image XObjects occupy the unit square, so the matrix scales straight to
/// the placed size.
fn generate_placement_command(xobject_name: &str, rect: &Rect) -> String {
    format!(
        "q {} 0 0 {} {} {} cm /{} Do Q\n",
        rect.width, rect.height, rect.x, rect.y, xobject_name
    )
}

/// Thin solid lines along the shared cell boundaries
fn generate_separators(segments: &[Segment], width: f32) -> String {
    let mut ops = String::new();
    ops.push_str("q\n");
    ops.push_str(&format!("{} G\n", SEPARATOR_GRAY));
    ops.push_str(&format!("{} w\n", width));
    ops.push_str("[] 0 d\n");
    for s in segments {
        ops.push_str(&format!("{} {} m {} {} l S\n", s.x1, s.y1, s.x2, s.y2));
    }
    ops.push_str("Q\n");
    ops
}
