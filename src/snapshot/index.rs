//! The immutable, indexed snapshot consulted by the resolver.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use super::types::{DirectoryEntry, FileDetail, HostId, HostMetadata, RepoArch, SnapshotContents};
use crate::error_handling::SnapshotError;
use crate::geography::ContinentGraph;
use crate::geoip::GeoIpDatabase;
use crate::network::{client_country, Netblock, NetblockTree};

/// Inputs combined with [`SnapshotContents`] when a snapshot is built.
///
/// These come from local files rather than the snapshot builder and are
/// kept across reloads.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSources {
    /// Country → continent table, before snapshot redirects.
    pub country_continents: Vec<(String, String)>,
    /// Research-network feed entries.
    pub research_netblocks: Vec<(Netblock, u32)>,
    /// Global BGP feed entries.
    pub global_netblocks: Vec<(Netblock, u32)>,
    pub geoip: Option<Arc<GeoIpDatabase>>,
}

/// A fully indexed snapshot. Never mutated once built.
#[derive(Debug)]
pub struct Snapshot {
    contents: SnapshotContents,
    host_netblocks: NetblockTree<Vec<HostId>>,
    netblock_countries: NetblockTree<String>,
    research_tree: NetblockTree<u32>,
    asn_tree: NetblockTree<u32>,
    continents: ContinentGraph,
    geoip: Option<Arc<GeoIpDatabase>>,
}

impl Snapshot {
    /// Normalises, validates and indexes `contents`.
    pub fn build(
        mut contents: SnapshotContents,
        sources: &SnapshotSources,
    ) -> Result<Self, SnapshotError> {
        contents.normalize_countries();
        contents.validate()?;

        let mut merged: HashMap<Netblock, Vec<HostId>> = HashMap::new();
        for (cidr, hosts) in &contents.host_netblocks {
            let netblock: Netblock = cidr.parse()?;
            merged.entry(netblock).or_default().extend(hosts.iter().copied());
        }
        let mut host_netblocks = NetblockTree::new();
        for (netblock, hosts) in merged {
            host_netblocks.insert(netblock, hosts)?;
        }

        let mut netblock_countries = NetblockTree::new();
        for (cidr, country) in &contents.netblock_countries {
            netblock_countries.insert(cidr.parse()?, country.clone())?;
        }

        let research_tree: NetblockTree<u32> = sources.research_netblocks.iter().copied().collect();
        let asn_tree: NetblockTree<u32> = sources
            .global_netblocks
            .iter()
            .filter(|(_, asn)| contents.asn_hosts.contains_key(asn))
            .copied()
            .collect();

        let continents =
            ContinentGraph::build(&sources.country_continents, &contents.country_continent_redirects);

        log::info!(
            "Built snapshot: {} directories, {} hosts, {} host netblocks, {} ASN netblocks, {} research netblocks",
            contents.directories.len(),
            contents.hosts.len(),
            host_netblocks.len(),
            asn_tree.len(),
            research_tree.len()
        );

        Ok(Self {
            contents,
            host_netblocks,
            netblock_countries,
            research_tree,
            asn_tree,
            continents,
            geoip: sources.geoip.clone(),
        })
    }

    /// The canonical contents this snapshot was built from.
    pub fn contents(&self) -> &SnapshotContents {
        &self.contents
    }

    pub fn time(&self) -> Option<&str> {
        self.contents.time.as_deref()
    }

    pub fn directory(&self, name: &str) -> Option<&DirectoryEntry> {
        self.contents.directories.get(name)
    }

    /// Directory serving `repo` on `arch`.
    pub fn repo_directory(&self, repo: &str, arch: &str) -> Option<&str> {
        self.contents
            .repo_index
            .get(&RepoArch::new(repo, arch))
            .map(String::as_str)
    }

    /// All known `(repo, arch)` pairs, sorted.
    pub fn repo_keys(&self) -> impl Iterator<Item = &RepoArch> {
        self.contents.repo_index.keys()
    }

    pub fn is_disabled(&self, repo: &str) -> bool {
        self.contents.disabled_repos.contains(repo)
    }

    /// `repo` after applying the repository redirect map.
    pub fn redirect_repo<'a>(&'a self, repo: &'a str) -> &'a str {
        self.contents
            .repo_redirects
            .get(repo)
            .map(String::as_str)
            .unwrap_or(repo)
    }

    pub fn location(&self, name: &str) -> Option<&[HostId]> {
        self.contents.locations.get(name).map(Vec::as_slice)
    }

    /// File records for `file` in `directory`, newest first.
    pub fn file_details(&self, directory: &str, file: &str) -> Option<&[FileDetail]> {
        self.contents
            .file_details
            .get(directory)
            .and_then(|files| files.get(file))
            .map(Vec::as_slice)
            .filter(|details| !details.is_empty())
    }

    pub fn url(&self, id: u32) -> Option<&str> {
        self.contents.urls.get(&id).map(String::as_str)
    }

    pub fn host(&self, id: HostId) -> Option<&HostMetadata> {
        self.contents.hosts.get(&id)
    }

    /// Bandwidth weight of a host; unknown hosts weigh 1.
    pub fn bandwidth(&self, id: HostId) -> i64 {
        self.host(id).map(|host| host.bandwidth).unwrap_or(1)
    }

    /// Whether `client_country` may be sent to host `id`.
    pub fn host_allows(&self, id: HostId, client_country: Option<&str>) -> bool {
        self.host(id)
            .map(|host| host.allows(client_country))
            .unwrap_or(true)
    }

    pub fn asn_hosts(&self, asn: u32) -> Option<&[HostId]> {
        self.contents.asn_hosts.get(&asn).map(Vec::as_slice)
    }

    pub fn host_netblocks(&self) -> &NetblockTree<Vec<HostId>> {
        &self.host_netblocks
    }

    pub fn research_tree(&self) -> &NetblockTree<u32> {
        &self.research_tree
    }

    pub fn asn_tree(&self) -> &NetblockTree<u32> {
        &self.asn_tree
    }

    pub fn continents(&self) -> &ContinentGraph {
        &self.continents
    }

    /// Country of the client at `ip`, from the netblock index or GeoIP.
    pub fn client_country(&self, ip: IpAddr) -> Option<String> {
        client_country(&self.netblock_countries, self.geoip.as_deref(), ip)
    }
}
