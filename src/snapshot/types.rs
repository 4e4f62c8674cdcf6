//! Canonical in-memory snapshot schema.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error_handling::SnapshotError;

/// Identifier of a mirror host.
pub type HostId = u32;

/// Identifier of an interned host/category URL.
pub type UrlId = u32;

/// Everything known about one published directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    /// Hosts serving the directory to anyone.
    #[serde(default)]
    pub global: BTreeSet<HostId>,
    /// Hosts per (upper-case) host country.
    #[serde(default)]
    pub by_country: BTreeMap<String, BTreeSet<HostId>>,
    /// Research-network hosts per country.
    #[serde(default)]
    pub by_country_research_net: BTreeMap<String, BTreeSet<HostId>>,
    /// URL ids registered for each host serving the directory.
    #[serde(default)]
    pub by_host_id: BTreeMap<HostId, Vec<UrlId>>,
    /// Path appended to every host URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
    /// `None` means the resolver default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered_mirror_list: Option<bool>,
}

/// Per-host attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMetadata {
    /// Bandwidth weight used by the weighted shuffle.
    #[serde(default)]
    pub bandwidth: i64,
    /// Upper-case country of the host.
    #[serde(default)]
    pub country: String,
    /// Client countries the host is restricted to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_countries: Option<BTreeSet<String>>,
    #[serde(default)]
    pub max_connections: u32,
}

impl HostMetadata {
    /// Whether a client from `client_country` may be sent to this host.
    ///
    /// An unknown client country is always allowed.
    pub fn allows(&self, client_country: Option<&str>) -> bool {
        match (client_country, &self.allowed_countries) {
            (Some(country), Some(allowed)) => allowed.contains(country),
            _ => true,
        }
    }
}

/// One checksum/size/timestamp record of a published file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha512: Option<String>,
}

/// A `(repository prefix, architecture)` pair, written as `repo+arch`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoArch {
    pub repo: String,
    pub arch: String,
}

impl RepoArch {
    pub fn new(repo: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            arch: arch.into(),
        }
    }
}

impl fmt::Display for RepoArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.repo, self.arch)
    }
}

impl TryFrom<String> for RepoArch {
    type Error = SnapshotError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        match key.rsplit_once('+') {
            Some((repo, arch)) if !repo.is_empty() && !arch.is_empty() => {
                Ok(RepoArch::new(repo, arch))
            }
            _ => Err(SnapshotError::InvalidRepoArchKey(key)),
        }
    }
}

impl From<RepoArch> for String {
    fn from(key: RepoArch) -> Self {
        key.to_string()
    }
}

/// The canonical schema every wire format decodes into.
///
/// Netblock keys are kept as CIDR text here and parsed when the snapshot is
/// built, so a malformed block rejects the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotContents {
    /// Creation time of the snapshot, as reported by the builder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub directories: BTreeMap<String, DirectoryEntry>,
    #[serde(default)]
    pub repo_index: BTreeMap<RepoArch, String>,
    #[serde(default)]
    pub host_netblocks: BTreeMap<String, Vec<HostId>>,
    #[serde(default)]
    pub netblock_countries: BTreeMap<String, String>,
    #[serde(default)]
    pub asn_hosts: BTreeMap<u32, Vec<HostId>>,
    #[serde(default)]
    pub locations: BTreeMap<String, Vec<HostId>>,
    #[serde(default)]
    pub disabled_repos: BTreeSet<String>,
    #[serde(default)]
    pub repo_redirects: BTreeMap<String, String>,
    #[serde(default)]
    pub country_continent_redirects: BTreeMap<String, String>,
    /// Directory → filename → records, newest first.
    #[serde(default)]
    pub file_details: BTreeMap<String, BTreeMap<String, Vec<FileDetail>>>,
    #[serde(default)]
    pub urls: BTreeMap<UrlId, String>,
    #[serde(default)]
    pub hosts: BTreeMap<HostId, HostMetadata>,
}

impl SnapshotContents {
    /// Upper-cases every country code in place.
    pub fn normalize_countries(&mut self) {
        for entry in self.directories.values_mut() {
            entry.by_country = upper_keys(std::mem::take(&mut entry.by_country));
            entry.by_country_research_net =
                upper_keys(std::mem::take(&mut entry.by_country_research_net));
        }
        for country in self.netblock_countries.values_mut() {
            *country = country.to_uppercase();
        }
        self.country_continent_redirects = std::mem::take(&mut self.country_continent_redirects)
            .into_iter()
            .map(|(country, continent)| (country.to_uppercase(), continent.to_uppercase()))
            .collect();
        for host in self.hosts.values_mut() {
            host.country = host.country.to_uppercase();
            if let Some(allowed) = host.allowed_countries.take() {
                host.allowed_countries =
                    Some(allowed.into_iter().map(|c| c.to_uppercase()).collect());
            }
        }
    }

    /// Checks that every host a directory lists has URLs in that directory.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for (name, entry) in &self.directories {
            let listed = entry
                .global
                .iter()
                .chain(entry.by_country.values().flatten())
                .chain(entry.by_country_research_net.values().flatten());
            for host_id in listed {
                if !entry.by_host_id.contains_key(host_id) {
                    return Err(SnapshotError::InconsistentDirectory {
                        directory: name.clone(),
                        host_id: *host_id,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Merges sets whose keys collide after upper-casing.
fn upper_keys(map: BTreeMap<String, BTreeSet<HostId>>) -> BTreeMap<String, BTreeSet<HostId>> {
    let mut result: BTreeMap<String, BTreeSet<HostId>> = BTreeMap::new();
    for (country, hosts) in map {
        result.entry(country.to_uppercase()).or_default().extend(hosts);
    }
    result
}
