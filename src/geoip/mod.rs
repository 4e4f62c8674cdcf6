//! GeoIP country lookup using a MaxMind GeoLite2 Country database.
//!
//! The database is optional. When configured it answers country lookups for
//! clients whose address is not covered by the snapshot's netblock→country
//! index.

mod loader;
mod lookup;
mod types;

// Re-export public API
pub use loader::load_from_file;
pub use lookup::GeoIpDatabase;
pub use types::GeoIpMetadata;
