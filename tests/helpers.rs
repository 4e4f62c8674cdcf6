// Shared test helpers: a small mirror network snapshot and request shortcuts.
//
// The fixture publishes one Fedora directory served by eleven hosts:
// - hosts 1-6 in US (bandwidth 100), all global
// - hosts 7-8 in FR and 9-10 in DE (bandwidth 50), all global
// - host 11 in GB (bandwidth 10), private, reachable through location "lab"
// Every host has an http and an https URL. 192.0.2.0/24 is the preferred
// netblock of hosts 1 and 2 and maps to US; 198.51.100.0/24 maps to FR.
//
// The network variant adds feeds: UNKNOWN_CLIENT's block belongs to
// CLIENT_ASN (hosts 3-5) and FR_CLIENT's block is a research network whose
// FR hosts are 7, 8, 9 and 10. Host 9 only serves DE clients.

#![allow(dead_code)] // Each test file uses a different subset

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::SeedableRng;

use mirrorlist_resolver::geography::builtin_country_continents;
use mirrorlist_resolver::render::MirrorListResponse;
use mirrorlist_resolver::resolve::{resolve, MirrorRequest, TierStats};
use mirrorlist_resolver::snapshot::{
    DirectoryEntry, FileDetail, HostId, HostMetadata, RepoArch, Snapshot, SnapshotContents,
    SnapshotSources,
};
use mirrorlist_resolver::ResolverOptions;

pub const DIR: &str = "pub/fedora/linux/releases/40/Everything/x86_64/os";
pub const REPODATA_DIR: &str = "pub/fedora/linux/releases/40/Everything/x86_64/os/repodata";
pub const SOURCE_DIR: &str = "pub/fedora/linux/releases/40/Everything/source/tree";
pub const CREATED: &str = "2026-10-01 12:00:00";

/// Client inside the preferred netblock of hosts 1 and 2.
pub const NETBLOCK_CLIENT: &str = "192.0.2.7";
/// Client that maps to FR and matches no host netblock.
pub const FR_CLIENT: &str = "198.51.100.5";
/// Client that matches nothing at all.
pub const UNKNOWN_CLIENT: &str = "203.0.113.9";
/// ASN announcing UNKNOWN_CLIENT's block in the network variant.
pub const CLIENT_ASN: u32 = 64500;

pub fn http_url(host_id: HostId) -> String {
    format!("http://mirror{}.example.org/{}", host_id, DIR)
}

pub fn https_url(host_id: HostId) -> String {
    format!("https://mirror{}.example.org/{}", host_id, DIR)
}

fn host(country: &str, bandwidth: i64) -> HostMetadata {
    HostMetadata {
        bandwidth,
        country: country.to_string(),
        allowed_countries: None,
        max_connections: 1,
    }
}

/// Directory entry listing hosts 1-11 with their URL ids.
fn fedora_entry(urls_of: impl Fn(HostId) -> Vec<u32>) -> DirectoryEntry {
    let mut entry = DirectoryEntry::default();
    for id in 1..=11 {
        entry.by_host_id.insert(id, urls_of(id));
    }
    entry.global = (1..=10).collect();
    entry.by_country.insert("US".to_string(), (1..=6).collect());
    entry.by_country.insert("FR".to_string(), [7, 8].into());
    entry.by_country.insert("DE".to_string(), [9, 10].into());
    entry.by_country.insert("GB".to_string(), [11].into());
    entry
}

/// The fixture snapshot contents.
pub fn fixture_contents() -> SnapshotContents {
    let mut contents = SnapshotContents {
        time: Some(CREATED.to_string()),
        ..Default::default()
    };

    for id in 1..=11u32 {
        let (country, bandwidth) = match id {
            1..=6 => ("US", 100),
            7 | 8 => ("FR", 50),
            9 | 10 => ("DE", 50),
            _ => ("GB", 10),
        };
        contents.hosts.insert(id, host(country, bandwidth));
        contents.urls.insert(id * 10 + 1, http_url(id));
        contents.urls.insert(id * 10 + 2, https_url(id));
        contents.urls.insert(
            id * 10 + 3,
            format!("http://mirror{}.example.org/{}", id, REPODATA_DIR),
        );
    }

    contents.directories.insert(
        DIR.to_string(),
        fedora_entry(|id| vec![id * 10 + 1, id * 10 + 2]),
    );
    contents
        .directories
        .insert(REPODATA_DIR.to_string(), fedora_entry(|id| vec![id * 10 + 3]));

    let mut source_entry = DirectoryEntry::default();
    source_entry.global.insert(1);
    source_entry.by_host_id.insert(1, vec![1000]);
    contents.urls.insert(
        1000,
        format!("http://mirror1.example.org/{}", SOURCE_DIR),
    );
    contents
        .directories
        .insert(SOURCE_DIR.to_string(), source_entry);

    contents
        .repo_index
        .insert(RepoArch::new("fedora-40", "x86_64"), DIR.to_string());
    contents
        .repo_index
        .insert(RepoArch::new("fedora-39", "x86_64"), DIR.to_string());
    contents
        .repo_index
        .insert(RepoArch::new("fedora-source-40", "source"), SOURCE_DIR.to_string());
    contents.disabled_repos.insert("fedora-39".to_string());
    contents
        .repo_redirects
        .insert("fedora-old".to_string(), "fedora-40".to_string());

    contents
        .host_netblocks
        .insert("192.0.2.0/24".to_string(), vec![1, 2]);
    contents
        .netblock_countries
        .insert("192.0.2.0/24".to_string(), "US".to_string());
    contents
        .netblock_countries
        .insert("198.51.100.0/24".to_string(), "fr".to_string());
    contents.locations.insert("lab".to_string(), vec![11]);

    let mut files = BTreeMap::new();
    files.insert(
        "repomd.xml".to_string(),
        vec![
            FileDetail {
                timestamp: Some(1_790_000_000),
                size: Some(4096),
                sha256: Some("ab".repeat(32)),
                ..Default::default()
            },
            FileDetail {
                timestamp: Some(1_780_000_000),
                size: Some(4000),
                sha256: Some("cd".repeat(32)),
                ..Default::default()
            },
        ],
    );
    contents
        .file_details
        .insert(REPODATA_DIR.to_string(), files);

    contents
}

/// Sources with the built-in continent table and no feeds.
pub fn fixture_sources() -> SnapshotSources {
    SnapshotSources {
        country_continents: builtin_country_continents(),
        ..Default::default()
    }
}

/// Fixture contents with ASN hosts, research-network hosts and an
/// allow-list on host 9.
pub fn network_contents(asn_hosts: Vec<HostId>) -> SnapshotContents {
    let mut contents = fixture_contents();
    contents.asn_hosts.insert(CLIENT_ASN, asn_hosts);
    contents
        .hosts
        .get_mut(&9)
        .expect("fixture host")
        .allowed_countries = Some(["DE".to_string()].into());
    contents
        .directories
        .get_mut(DIR)
        .expect("fixture directory")
        .by_country_research_net
        .insert("FR".to_string(), [7, 8, 9, 10].into());
    contents
}

/// Sources with both netblock feeds populated.
pub fn network_sources() -> SnapshotSources {
    SnapshotSources {
        global_netblocks: vec![("203.0.113.0/24".parse().expect("cidr"), CLIENT_ASN)],
        research_netblocks: vec![("198.51.100.0/24".parse().expect("cidr"), 11537)],
        ..fixture_sources()
    }
}

pub fn build_network_snapshot(contents: SnapshotContents) -> Snapshot {
    Snapshot::build(contents, &network_sources()).expect("fixture snapshot should build")
}

pub fn build_snapshot(contents: SnapshotContents) -> Snapshot {
    Snapshot::build(contents, &fixture_sources()).expect("fixture snapshot should build")
}

pub fn fixture_snapshot() -> Snapshot {
    build_snapshot(fixture_contents())
}

/// Resolves `query` with default options and a seeded generator.
pub fn resolve_query(snapshot: &Snapshot, query: &str) -> MirrorListResponse {
    resolve_with(snapshot, query, &ResolverOptions::default(), 7)
}

pub fn resolve_with(
    snapshot: &Snapshot,
    query: &str,
    options: &ResolverOptions,
    seed: u64,
) -> MirrorListResponse {
    let request = MirrorRequest::from_query(query).expect("query should decode");
    let mut rng = StdRng::seed_from_u64(seed);
    resolve(snapshot, &request, options, &mut rng, &TierStats::new())
}

pub fn message(response: &MirrorListResponse) -> &str {
    response.message.as_deref().unwrap_or_default()
}

pub fn host_set(response: &MirrorListResponse) -> BTreeSet<HostId> {
    response.host_ids().into_iter().collect()
}
