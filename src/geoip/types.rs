//! GeoIP data structures.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Metadata about the GeoIP database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpMetadata {
    /// Source path
    pub source: String,
    /// Database build version (from the database's build epoch)
    pub version: String,
    /// Load timestamp
    pub last_updated: SystemTime,
}
