pub mod catalog;
pub mod compositor;
pub mod constants;
pub mod export;
pub mod fetch;
pub mod fields;
pub mod fonts;
#[cfg(feature = "serde")]
mod job;
pub mod layout;
mod options;
pub mod render;
pub mod scaler;
mod selection;
mod stats;
mod store;
mod types;

pub use catalog::{CsvCatalog, TemplateCatalog};
pub use export::{ExportOutcome, ExportPipeline};
pub use fetch::{FileFetcher, ImageFetcher, RetryingFetcher};
pub use fields::{EffectiveField, FieldCustomization, FieldDefinition, StyleChange};
pub use fonts::{FontKey, FontProvider, FontRegistry, ResolvedFace};
#[cfg(feature = "serde")]
pub use job::{ExportJob, JobTemplate};
pub use options::*;
pub use scaler::{DisplayDelta, PositionUpdate, drag_update, to_display, to_source};
pub use selection::{Selection, Session};
pub use stats::calculate_statistics;
pub use store::{FieldStateStore, StoreSnapshot};
pub use types::*;
