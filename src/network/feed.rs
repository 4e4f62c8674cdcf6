//! Netblock feed ingestion.
//!
//! Feeds are plain text with one `CIDR ASN` pair per line, as exported from
//! BGP tables. Comments, blank lines, malformed lines and default routes
//! are skipped.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use super::netblock::Netblock;

/// Parses a netblock feed, keeping only ASNs in `asns_wanted` when given.
pub fn parse_netblock_feed(content: &str, asns_wanted: Option<&HashSet<u32>>) -> Vec<(Netblock, u32)> {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((netblock, asn)) = parse_feed_line(trimmed) else {
            skipped += 1;
            continue;
        };
        if netblock.prefix_len == 0 {
            continue;
        }
        if asns_wanted.is_some_and(|wanted| !wanted.contains(&asn)) {
            continue;
        }
        entries.push((netblock, asn));
    }

    if skipped > 0 {
        log::debug!("Skipped {} malformed netblock feed lines", skipped);
    }
    entries
}

fn parse_feed_line(line: &str) -> Option<(Netblock, u32)> {
    let mut fields = line.split_whitespace();
    let cidr = fields.next()?;
    // A feed line must carry an explicit prefix length
    if !cidr.contains('/') {
        return None;
    }
    let netblock: Netblock = cidr.parse().ok()?;
    let asn: u32 = fields.next()?.parse().ok()?;
    Some((netblock, asn))
}

/// Reads and parses a netblock feed file.
pub async fn load_netblock_feed(
    path: &Path,
    asns_wanted: Option<&HashSet<u32>>,
) -> Result<Vec<(Netblock, u32)>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read netblock feed {}", path.display()))?;
    let entries = parse_netblock_feed(&content, asns_wanted);
    log::info!(
        "Loaded {} netblocks from {}",
        entries.len(),
        path.display()
    );
    Ok(entries)
}
