//! Document assembly

use crate::layout::PageDescriptor;
use crate::types::*;
use image::RgbaImage;
use lopdf::{Dictionary, Document, Object};

use super::render_page;

/// A finished document and the cells that had to be left blank
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub document: Document,
    pub encoding_failures: usize,
}

/// Build one PDF page per descriptor, in order.
pub fn assemble(
    pages: &[PageDescriptor],
    rasters: &[RgbaImage],
    separator_width_pt: f32,
) -> AssembledDocument {
    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();

    let mut page_refs = Vec::with_capacity(pages.len());
    let mut encoding_failures = 0;
    for page in pages {
        let rendered = render_page(&mut output, page, rasters, pages_tree_id, separator_width_pt);
        encoding_failures += rendered.encoding_failures;
        page_refs.push(Object::Reference(rendered.page_id));
    }

    // Create pages tree
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);

    AssembledDocument {
        document: output,
        encoding_failures,
    }
}

/// Serialize a document to bytes
pub fn serialize(mut doc: Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}
