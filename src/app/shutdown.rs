//! Graceful shutdown handling.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Stops the background tasks of a batch run.
///
/// Cancels the shared token, then waits for the progress logger and the
/// snapshot reload task, if either was started.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<JoinHandle<()>>,
    reload_task: Option<JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        if let Err(e) = logging_task.await {
            log::warn!("Progress logger ended abnormally: {}", e);
        }
    }
    if let Some(reload_task) = reload_task {
        if let Err(e) = reload_task.await {
            log::warn!("Snapshot reload task ended abnormally: {}", e);
        }
    }
}
