//! Progress logging utilities.

use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Logs how many requests have been answered so far and the rate.
///
/// # Arguments
///
/// * `start_time` - When the batch started
/// * `completed` - Atomic counter of answered requests
/// * `bad_requests` - Atomic counter of requests rejected as malformed
pub fn log_progress(
    start_time: std::time::Instant,
    completed: &Arc<AtomicUsize>,
    bad_requests: &Arc<AtomicUsize>,
) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let completed = completed.load(Ordering::SeqCst);
    let bad = bad_requests.load(Ordering::SeqCst);
    let rate = if elapsed_secs > 0.0 {
        completed as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Resolved {} requests ({} bad) in {:.2} seconds (~{:.2} requests/sec)",
        completed, bad, elapsed_secs, rate
    );
}
