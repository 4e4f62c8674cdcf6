//! Error types.
//!
//! This module provides:
//! - Initialization errors (logger setup)
//! - Snapshot decoding and construction errors
//! - Netblock parsing errors
//! - Request decoding errors (surfaced as `400 Bad Request`)
//!
//! Resolution itself never fails: unknown repositories, disabled
//! repositories and missing files are ordinary responses.

mod types;

// Re-export public API
pub use types::{InitializationError, NetblockError, RequestError, SnapshotError};
