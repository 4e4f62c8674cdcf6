//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger
//! - Concurrency semaphore for the batch runner
//! - Request-scoped random number generators

mod logger;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Semaphore;

// Re-export public API
pub use logger::init_logger_with;

/// Initializes a semaphore for controlling concurrency.
///
/// Creates a new semaphore with the specified permit count. This semaphore is used
/// to limit the number of concurrently resolved requests.
pub fn init_semaphore(count: usize) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(count.max(1)))
}

/// Creates a random number generator owned by a single request.
///
/// Each request gets its own OS-seeded generator so that concurrent requests
/// never share state and their orderings stay independent.
pub fn init_request_rng() -> StdRng {
    StdRng::from_os_rng()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_init_semaphore_never_zero() {
        assert_eq!(init_semaphore(0).available_permits(), 1);
        assert_eq!(init_semaphore(8).available_permits(), 8);
    }

    #[test]
    fn test_request_rngs_are_independent() {
        let mut a = init_request_rng();
        let mut b = init_request_rng();
        let xs: Vec<u64> = (0..4).map(|_| a.random()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.random()).collect();
        assert_ne!(xs, ys);
    }
}
