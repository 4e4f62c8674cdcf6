//! Batch runner helpers.
//!
//! Progress logging, graceful shutdown of background tasks, and the
//! end-of-run statistics printed by the batch runner.

pub mod logging;
pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use shutdown::shutdown_gracefully;
pub use statistics::{print_run_summary, print_tier_statistics};
