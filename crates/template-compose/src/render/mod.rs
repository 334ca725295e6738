//! PDF rendering modules
//!
//! This module handles all PDF-specific operations:
//! - Encoding composed rasters as image XObjects
//! - Building output pages from page descriptors
//! - Assembling the page tree and catalog

mod document;
mod page;
mod xobject;

pub use document::*;
pub use page::*;
pub use xobject::*;
