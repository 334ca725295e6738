use std::path::PathBuf;
use template_compose::{
    ExportPipeline, FontProvider, ImageFetcher, InstanceId, Result, Session, calculate_statistics,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{ComposeCommand, ComposeUpdate, ExportId};

/// Export running on its own task
struct RunningExport {
    id: ExportId,
    handle: JoinHandle<()>,
}

/// State owned by the worker between commands
struct WorkerState<F, P> {
    session: Session,
    pipeline: ExportPipeline<F, P>,
    running: Option<RunningExport>,
    next_export: u64,
}

/// Async worker task that owns the editing session and runs exports.
///
/// Edits are applied in arrival order. Exports run on their own task with a
/// snapshot of the session, so edits keep flowing while one is in flight.
/// Starting a new export or sending `CancelExport` aborts the running one.
pub async fn worker_task<F: ImageFetcher, P: FontProvider>(
    pipeline: ExportPipeline<F, P>,
    mut command_rx: mpsc::UnboundedReceiver<ComposeCommand>,
    update_tx: mpsc::UnboundedSender<ComposeUpdate>,
) {
    let mut state = WorkerState {
        session: Session::new(),
        pipeline,
        running: None,
        next_export: 1,
    };

    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            ComposeCommand::Preview { max_pages } => {
                handle_preview(max_pages, &mut state, &mut command_rx, &update_tx).await;
            }
            other => process_command(other, &mut state, &update_tx),
        }
    }
    log::debug!("Command channel closed, worker exiting");
}

fn process_command<F: ImageFetcher, P: FontProvider>(
    cmd: ComposeCommand,
    state: &mut WorkerState<F, P>,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) {
    match cmd {
        ComposeCommand::AddTemplate { asset } => {
            let category = asset.category;
            let id = state.session.add_template(asset);
            let _ = update_tx.send(ComposeUpdate::InstanceAdded { id, category });
        }
        ComposeCommand::RemoveInstance { id } => match state.session.remove_instance(id) {
            Ok(_) => {
                let _ = update_tx.send(ComposeUpdate::InstanceRemoved { id });
            }
            Err(e) => send_error(update_tx, e),
        },
        ComposeCommand::SetText { id, field, text } => {
            let result = state.session.set_text(id, &field, text);
            report_field(&state.session, id, &field, result, update_tx);
        }
        ComposeCommand::SetPosition { id, field, x, y } => {
            let result = state.session.set_position(id, &field, x, y);
            report_field(&state.session, id, &field, result, update_tx);
        }
        ComposeCommand::SetStyle { id, field, change } => {
            let result = state.session.set_style(id, &field, change);
            report_field(&state.session, id, &field, result, update_tx);
        }
        ComposeCommand::DragStop { id, field, delta } => {
            let result = state.session.drag_stop(id, &field, delta).map(|_| ());
            report_field(&state.session, id, &field, result, update_tx);
        }
        ComposeCommand::CalculateStats => {
            let stats = calculate_statistics(&state.session.selection().categories());
            let _ = update_tx.send(ComposeUpdate::StatsCalculated { stats });
        }
        ComposeCommand::Preview { .. } => {
            log::debug!("Preview commands are handled by the worker loop");
        }
        ComposeCommand::Export { output_path } => {
            cancel_running(state, update_tx);
            start_export(state, output_path, update_tx);
        }
        ComposeCommand::CancelExport => {
            if !cancel_running(state, update_tx) {
                log::debug!("No export running, nothing to cancel");
            }
        }
    }
}

async fn handle_preview<F: ImageFetcher, P: FontProvider>(
    mut max_pages: usize,
    state: &mut WorkerState<F, P>,
    command_rx: &mut mpsc::UnboundedReceiver<ComposeCommand>,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) {
    // Drain any queued preview commands, keeping only the most recent
    while let Ok(next_cmd) = command_rx.try_recv() {
        if let ComposeCommand::Preview {
            max_pages: newer_max_pages,
        } = next_cmd
        {
            log::debug!("Discarding queued preview, using newer request");
            max_pages = newer_max_pages;
        } else {
            // Can't put it back, so apply it before rendering the preview
            process_command(next_cmd, state, update_tx);
        }
    }

    let (instances, snapshot) = state.session.snapshot();
    let outcome = state.pipeline.preview(&instances, &snapshot, max_pages).await;
    let _ = update_tx.send(ComposeUpdate::PreviewGenerated {
        document: outcome.document,
        page_count: outcome.page_count,
        failure_count: outcome.failure_count,
    });
}

fn start_export<F: ImageFetcher, P: FontProvider>(
    state: &mut WorkerState<F, P>,
    output_path: PathBuf,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) {
    let export_id = ExportId(state.next_export);
    state.next_export += 1;

    // Snapshot before the task starts; later edits must not leak in
    let (instances, snapshot) = state.session.snapshot();
    let pipeline = state.pipeline.clone();
    let tx = update_tx.clone();

    let _ = update_tx.send(ComposeUpdate::ExportStarted {
        export_id,
        instance_count: instances.len(),
    });
    log::info!("Starting export {} with {} instance(s)", export_id.0, instances.len());

    let handle = tokio::spawn(async move {
        let outcome = pipeline.export(&instances, &snapshot).await;
        if outcome.document.is_empty() {
            let _ = tx.send(ComposeUpdate::Error {
                message: format!("Export {} produced no document", export_id.0),
            });
            return;
        }
        match tokio::fs::write(&output_path, &outcome.document).await {
            Ok(()) => {
                let _ = tx.send(ComposeUpdate::ExportComplete {
                    export_id,
                    path: output_path,
                    page_count: outcome.page_count,
                    failure_count: outcome.failure_count,
                });
            }
            Err(e) => {
                let _ = tx.send(ComposeUpdate::Error {
                    message: format!("Failed to write {}: {}", output_path.display(), e),
                });
            }
        }
    });

    state.running = Some(RunningExport {
        id: export_id,
        handle,
    });
}

/// Abort the running export, if it has not finished yet.
///
/// Returns true when an export was actually cancelled.
fn cancel_running<F, P>(
    state: &mut WorkerState<F, P>,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) -> bool {
    let Some(running) = state.running.take() else {
        return false;
    };
    if running.handle.is_finished() {
        return false;
    }
    running.handle.abort();
    log::info!("Cancelled export {}", running.id.0);
    let _ = update_tx.send(ComposeUpdate::ExportCancelled { export_id: running.id });
    true
}

fn report_field(
    session: &Session,
    id: InstanceId,
    field: &str,
    result: Result<()>,
    update_tx: &mpsc::UnboundedSender<ComposeUpdate>,
) {
    let outcome = result.and_then(|()| session.effective(id, field));
    match outcome {
        Ok(field) => {
            let _ = update_tx.send(ComposeUpdate::FieldChanged { id, field });
        }
        Err(e) => send_error(update_tx, e),
    }
}

fn send_error(update_tx: &mpsc::UnboundedSender<ComposeUpdate>, error: impl std::fmt::Display) {
    log::warn!("{}", error);
    let _ = update_tx.send(ComposeUpdate::Error {
        message: error.to_string(),
    });
}
