//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (thresholds, metalink attributes, protocol policy)
//! - CLI option types and parsing
//! - Per-request resolver options

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, ResolverOptions};
