//! Randomised orderings applied to tier results.
//!
//! All functions take the caller's generator; the resolver hands them a
//! generator owned by the request, never a shared one.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::network::{IpVersion, Netblock};

/// Weighted shuffle without replacement.
///
/// Each draw picks an item with probability proportional to its weight
/// among the items not drawn yet, so heavier items tend to come first but
/// every item appears exactly once. Weights below 1 count as 1.
///
/// Weights are summed as `u128`, so any number of `i64::MAX` bandwidths
/// cannot overflow the total.
pub fn weighted_shuffle<T, R: Rng + ?Sized>(items: Vec<(i64, T)>, rng: &mut R) -> Vec<T> {
    let mut pool: Vec<(u128, T)> = items
        .into_iter()
        .map(|(weight, item)| (u128::try_from(weight.max(1)).unwrap_or(1), item))
        .collect();
    let mut total: u128 = pool.iter().map(|(weight, _)| *weight).sum();
    let mut ordered = Vec::with_capacity(pool.len());

    while !pool.is_empty() {
        let target = rng.random_range(0..total);
        let mut cumulative = 0u128;
        let mut index = pool.len() - 1;
        for (i, (weight, _)) in pool.iter().enumerate() {
            cumulative += weight;
            if target < cumulative {
                index = i;
                break;
            }
        }
        let (weight, item) = pool.remove(index);
        total -= weight;
        ordered.push(item);
    }
    ordered
}

/// Netblock-size ordering for ordered mirror lists.
///
/// IPv6 matches come before IPv4 matches; within each group smaller
/// (more specific) blocks come first and equal-size blocks are in random
/// order.
pub fn ordered_netblocks<T, R: Rng + ?Sized>(matches: Vec<(Netblock, T)>, rng: &mut R) -> Vec<T> {
    let (mut v6, mut v4): (Vec<_>, Vec<_>) = matches
        .into_iter()
        .partition(|(netblock, _)| netblock.version == IpVersion::V6);

    // Shuffle first; the stable sort keeps the random order among equals
    v6.shuffle(rng);
    v6.sort_by_key(|(netblock, _)| netblock.host_bits());
    v4.shuffle(rng);
    v4.sort_by_key(|(netblock, _)| netblock.host_bits());

    v6.into_iter().chain(v4).map(|(_, item)| item).collect()
}

/// Uniform random permutation.
pub fn random_shuffle<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}
