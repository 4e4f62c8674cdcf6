//! Loading snapshots and their local sources from disk.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::index::{Snapshot, SnapshotSources};
use super::types::SnapshotContents;
use super::wire::decode_snapshot;
use crate::config::Config;
use crate::geography::{builtin_country_continents, load_country_continent_csv};
use crate::geoip;
use crate::network::load_netblock_feed;

/// Loads the feeds, continent table and GeoIP database named by `config`.
pub async fn load_sources(config: &Config) -> Result<SnapshotSources> {
    let country_continents = match &config.country_continent_csv {
        Some(path) => load_country_continent_csv(path).await?,
        None => builtin_country_continents(),
    };

    let research_netblocks = match &config.research_netblocks {
        Some(path) => load_netblock_feed(path, None).await?,
        None => Vec::new(),
    };

    // Filtered against the snapshot's ASN map at build time
    let global_netblocks = match &config.global_netblocks {
        Some(path) => load_netblock_feed(path, None).await?,
        None => Vec::new(),
    };

    let geoip = match &config.geoip {
        Some(path) => Some(Arc::new(geoip::load_from_file(path).await?)),
        None => None,
    };

    Ok(SnapshotSources {
        country_continents,
        research_netblocks,
        global_netblocks,
        geoip,
    })
}

/// Reads and decodes a snapshot file without indexing it.
pub async fn read_contents(path: &Path) -> Result<SnapshotContents> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let contents = decode_snapshot(&bytes)
        .with_context(|| format!("Failed to decode snapshot {}", path.display()))?;
    Ok(contents)
}

/// Reads, decodes and indexes a snapshot file.
///
/// Decoding and indexing run on the blocking pool.
pub async fn load_snapshot(path: &Path, sources: Arc<SnapshotSources>) -> Result<Snapshot> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let display = path.display().to_string();

    tokio::task::spawn_blocking(move || {
        let contents = decode_snapshot(&bytes)
            .with_context(|| format!("Failed to decode snapshot {}", display))?;
        Snapshot::build(contents, &sources)
            .with_context(|| format!("Failed to index snapshot {}", display))
    })
    .await
    .context("Snapshot build task panicked")?
}
