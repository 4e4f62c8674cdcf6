//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::resolve::{Tier, TierStats};

/// Logs how many requests got their best mirror from each tier.
pub fn print_tier_statistics(stats: &TierStats) {
    let total = stats.total();
    if total == 0 {
        info!("No requests were resolved");
        return;
    }
    info!("Best mirror source ({} total):", total);
    for tier in Tier::iter() {
        let count = stats.count(tier);
        if count > 0 {
            info!(
                "   {}: {} ({:.1}%)",
                tier.as_str(),
                count,
                count as f64 * 100.0 / total as f64
            );
        }
    }
    let unresolved = stats.unresolved();
    if unresolved > 0 {
        info!("   none: {}", unresolved);
    }
}

/// Logs a one-line summary of the run.
pub fn print_run_summary(total: usize, successful: usize, bad_requests: usize, elapsed_seconds: f64) {
    info!(
        "Answered {} request{} ({} ok, {} bad) in {:.1}s",
        total,
        if total == 1 { "" } else { "s" },
        successful,
        bad_requests,
        elapsed_seconds
    );
}
