//! GeoIP database loading from files.

use anyhow::{Context, Result};
use maxminddb::Reader;
use std::path::Path;
use std::time::SystemTime;

use super::lookup::GeoIpDatabase;
use super::types::GeoIpMetadata;

/// Loads a GeoIP Country database from a local `.mmdb` file.
pub async fn load_from_file(path: &Path) -> Result<GeoIpDatabase> {
    log::info!("Loading GeoIP database from: {}", path.display());

    let db_bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read GeoIP database from {}", path.display()))?;

    let reader = Reader::from_source(db_bytes)
        .with_context(|| format!("Failed to parse GeoIP database from {}", path.display()))?;

    let metadata = extract_metadata(&reader, &path.to_string_lossy());
    log::info!("GeoIP database loaded ({})", metadata.version);

    Ok(GeoIpDatabase::new(reader, metadata))
}

/// Extracts metadata from a GeoIP database
fn extract_metadata<T: AsRef<[u8]>>(reader: &Reader<T>, source: &str) -> GeoIpMetadata {
    GeoIpMetadata {
        source: source.to_string(),
        version: format!("build_{}", reader.metadata.build_epoch),
        last_updated: SystemTime::now(),
    }
}
