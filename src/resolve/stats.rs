//! Per-tier resolution statistics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::tier::Tier;

/// Thread-safe counters of which tier supplied each request's best mirror.
///
/// Shared across request tasks through an `Arc`. Requests where no tier
/// produced a host are counted separately.
pub struct TierStats {
    best_from: HashMap<Tier, AtomicUsize>,
    unresolved: AtomicUsize,
}

impl TierStats {
    pub fn new() -> Self {
        let mut best_from = HashMap::new();
        for tier in Tier::iter() {
            best_from.insert(tier, AtomicUsize::new(0));
        }
        TierStats {
            best_from,
            unresolved: AtomicUsize::new(0),
        }
    }

    /// Records the tier that supplied the first host, or `None`.
    pub fn record(&self, tier: Option<Tier>) {
        match tier {
            Some(tier) => {
                if let Some(counter) = self.best_from.get(&tier) {
                    counter.fetch_add(1, Ordering::Relaxed);
                } else {
                    log::error!("No counter for tier {:?}", tier);
                }
            }
            None => {
                self.unresolved.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Requests whose best mirror came from `tier`.
    pub fn count(&self, tier: Tier) -> usize {
        self.best_from
            .get(&tier)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Requests where no tier produced a host.
    pub fn unresolved(&self) -> usize {
        self.unresolved.load(Ordering::SeqCst)
    }

    /// All recorded requests.
    pub fn total(&self) -> usize {
        Tier::iter().map(|t| self.count(t)).sum::<usize>() + self.unresolved()
    }
}

impl Default for TierStats {
    fn default() -> Self {
        Self::new()
    }
}
