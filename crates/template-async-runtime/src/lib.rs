use std::path::PathBuf;

// Re-export types from the engine crate
pub use template_compose::{
    Category, DisplayDelta, EffectiveField, ExportStatistics, InstanceId, StyleChange,
    TemplateAsset,
};

mod worker;

pub use worker::worker_task;

/// Commands sent from the editor to the worker
#[derive(Debug)]
pub enum ComposeCommand {
    AddTemplate {
        asset: TemplateAsset,
    },
    RemoveInstance {
        id: InstanceId,
    },
    SetText {
        id: InstanceId,
        field: String,
        text: String,
    },
    SetPosition {
        id: InstanceId,
        field: String,
        x: i32,
        y: i32,
    },
    SetStyle {
        id: InstanceId,
        field: String,
        change: StyleChange,
    },
    /// A drag finished; the delta is in display pixels
    DragStop {
        id: InstanceId,
        field: String,
        delta: DisplayDelta,
    },
    CalculateStats,
    /// Render the first pages only; queued previews collapse into the newest
    Preview {
        max_pages: usize,
    },
    Export {
        output_path: PathBuf,
    },
    CancelExport,
}

/// Updates sent from the worker to the editor
#[derive(Debug, Clone)]
pub enum ComposeUpdate {
    InstanceAdded {
        id: InstanceId,
        category: Category,
    },
    InstanceRemoved {
        id: InstanceId,
    },
    FieldChanged {
        id: InstanceId,
        field: EffectiveField,
    },
    StatsCalculated {
        stats: ExportStatistics,
    },
    PreviewGenerated {
        document: Vec<u8>,
        page_count: usize,
        failure_count: usize,
    },
    ExportStarted {
        export_id: ExportId,
        instance_count: usize,
    },
    ExportComplete {
        export_id: ExportId,
        path: PathBuf,
        page_count: usize,
        failure_count: usize,
    },
    ExportCancelled {
        export_id: ExportId,
    },
    Error {
        message: String,
    },
}

/// Handle to one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExportId(pub u64);
