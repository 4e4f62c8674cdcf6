//! Snapshot wire formats.
//!
//! Two JSON forms are understood:
//!
//! - **v1** (legacy): the key/value entry lists of the original cache
//!   export, PascalCase field names, repository keys as `repo+arch`.
//! - **v2** (canonical): `{"version": 2, "snapshot": {...}}` wrapping
//!   [`SnapshotContents`] directly.
//!
//! Documents without a `version` field are treated as v1. Encoding always
//! writes v2.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::types::{DirectoryEntry, FileDetail, HostId, HostMetadata, RepoArch, SnapshotContents, UrlId};
use crate::error_handling::SnapshotError;

/// Wire version written by [`encode_snapshot`].
pub const CURRENT_VERSION: u32 = 2;

/// Maps one wire format into the canonical schema.
pub trait SnapshotDecoder: Send + Sync {
    /// Wire version this decoder understands.
    fn version(&self) -> u32;

    /// Decodes a complete document.
    fn decode(&self, bytes: &[u8]) -> Result<SnapshotContents, SnapshotError>;
}

/// Decoder for the legacy v1 key/value form.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDecoder;

/// Decoder for the canonical v2 envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalDecoder;

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: Option<u32>,
}

#[derive(Deserialize)]
struct CanonicalEnvelope {
    snapshot: SnapshotContents,
}

#[derive(Serialize)]
struct CanonicalEnvelopeRef<'a> {
    version: u32,
    snapshot: &'a SnapshotContents,
}

/// Decodes a snapshot document of any supported version.
pub fn decode_snapshot(bytes: &[u8]) -> Result<SnapshotContents, SnapshotError> {
    let probe: VersionProbe = serde_json::from_slice(bytes)?;
    let version = probe.version.unwrap_or(1);
    let decoders: [&dyn SnapshotDecoder; 2] = [&LegacyDecoder, &CanonicalDecoder];
    let decoder = decoders
        .into_iter()
        .find(|decoder| decoder.version() == version)
        .ok_or(SnapshotError::UnsupportedVersion(version))?;
    log::debug!("Decoding snapshot with wire version {}", version);
    decoder.decode(bytes)
}

/// Encodes a snapshot in the canonical v2 form.
pub fn encode_snapshot(contents: &SnapshotContents) -> Result<Vec<u8>, SnapshotError> {
    let envelope = CanonicalEnvelopeRef {
        version: CURRENT_VERSION,
        snapshot: contents,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

impl SnapshotDecoder for CanonicalDecoder {
    fn version(&self) -> u32 {
        CURRENT_VERSION
    }

    fn decode(&self, bytes: &[u8]) -> Result<SnapshotContents, SnapshotError> {
        let envelope: CanonicalEnvelope = serde_json::from_slice(bytes)?;
        Ok(envelope.snapshot)
    }
}

#[derive(Deserialize)]
struct Entry<K, V> {
    key: K,
    value: V,
}

#[derive(Deserialize)]
struct Entries<K, V> {
    key: K,
    #[serde(default = "Vec::new")]
    value: Vec<V>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyMirrorList {
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    mirror_list_cache: Vec<LegacyDirectory>,
    #[serde(default)]
    host_netblock_cache: Vec<Entries<String, HostId>>,
    #[serde(default)]
    netblock_country_cache: Vec<Entry<String, String>>,
    #[serde(default)]
    host_asn_cache: Vec<Entries<u32, HostId>>,
    #[serde(default)]
    location_cache: Vec<Entries<String, HostId>>,
    #[serde(rename = "HCUrlCache", default)]
    hc_url_cache: Vec<Entry<UrlId, String>>,
    #[serde(default)]
    file_details_cache: Vec<LegacyFileDetailsDirectory>,
    #[serde(default)]
    disabled_repository_cache: Vec<Entry<String, bool>>,
    #[serde(default)]
    country_continent_redirect_cache: Vec<Entry<String, String>>,
    #[serde(default)]
    repository_redirect_cache: Vec<Entry<String, String>>,
    #[serde(default)]
    repo_arch_to_directory_name: Vec<Entry<String, String>>,
    #[serde(default)]
    host_max_connection_cache: Vec<Entry<HostId, u32>>,
    #[serde(default)]
    host_country_cache: Vec<Entry<HostId, String>>,
    #[serde(default)]
    host_bandwidth_cache: Vec<Entry<HostId, i64>>,
    #[serde(default)]
    host_country_allowed_cache: Vec<Entries<HostId, String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyDirectory {
    #[serde(rename = "directory")]
    directory: String,
    #[serde(default)]
    subpath: Option<String>,
    #[serde(default)]
    ordered_mirror_list: Option<bool>,
    #[serde(default)]
    global: Vec<HostId>,
    #[serde(default)]
    by_country: Vec<Entries<String, HostId>>,
    #[serde(default)]
    by_country_internet2: Vec<Entries<String, HostId>>,
    #[serde(default)]
    by_host_id: Vec<Entries<HostId, UrlId>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyFileDetailsDirectory {
    #[serde(rename = "directory")]
    directory: String,
    #[serde(default)]
    file_details_cache_files: Vec<LegacyFileDetailsFile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyFileDetailsFile {
    #[serde(rename = "filename")]
    filename: String,
    #[serde(default)]
    file_details: Vec<LegacyFileDetail>,
}

#[derive(Deserialize)]
struct LegacyFileDetail {
    #[serde(rename = "TimeStamp", default)]
    timestamp: Option<i64>,
    #[serde(rename = "Size", default)]
    size: Option<i64>,
    #[serde(rename = "MD5", default)]
    md5: Option<String>,
    #[serde(rename = "SHA1", default)]
    sha1: Option<String>,
    #[serde(rename = "SHA256", default)]
    sha256: Option<String>,
    #[serde(rename = "SHA512", default)]
    sha512: Option<String>,
}

/// Empty strings stand for unset values in the legacy export.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn entries_to_set<K: Ord>(entries: Vec<Entries<K, HostId>>) -> BTreeMap<K, BTreeSet<HostId>> {
    let mut map: BTreeMap<K, BTreeSet<HostId>> = BTreeMap::new();
    for entry in entries {
        map.entry(entry.key).or_default().extend(entry.value);
    }
    map
}

fn entries_to_vec<K: Ord, V>(entries: Vec<Entries<K, V>>) -> BTreeMap<K, Vec<V>> {
    let mut map: BTreeMap<K, Vec<V>> = BTreeMap::new();
    for entry in entries {
        map.entry(entry.key).or_default().extend(entry.value);
    }
    map
}

fn format_epoch(seconds: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
}

impl SnapshotDecoder for LegacyDecoder {
    fn version(&self) -> u32 {
        1
    }

    fn decode(&self, bytes: &[u8]) -> Result<SnapshotContents, SnapshotError> {
        let legacy: LegacyMirrorList = serde_json::from_slice(bytes)?;

        let directories = legacy
            .mirror_list_cache
            .into_iter()
            .map(|dir| {
                let entry = DirectoryEntry {
                    global: dir.global.into_iter().collect(),
                    by_country: entries_to_set(dir.by_country),
                    by_country_research_net: entries_to_set(dir.by_country_internet2),
                    by_host_id: entries_to_vec(dir.by_host_id),
                    subpath: non_empty(dir.subpath),
                    ordered_mirror_list: dir.ordered_mirror_list,
                };
                (dir.directory, entry)
            })
            .collect();

        let repo_index = legacy
            .repo_arch_to_directory_name
            .into_iter()
            .map(|entry| Ok((RepoArch::try_from(entry.key)?, entry.value)))
            .collect::<Result<BTreeMap<_, _>, SnapshotError>>()?;

        let file_details = legacy
            .file_details_cache
            .into_iter()
            .map(|dir| {
                let files = dir
                    .file_details_cache_files
                    .into_iter()
                    .map(|file| {
                        let details = file
                            .file_details
                            .into_iter()
                            .map(|d| FileDetail {
                                timestamp: d.timestamp,
                                size: d.size,
                                md5: non_empty(d.md5),
                                sha1: non_empty(d.sha1),
                                sha256: non_empty(d.sha256),
                                sha512: non_empty(d.sha512),
                            })
                            .collect();
                        (file.filename, details)
                    })
                    .collect();
                (dir.directory, files)
            })
            .collect();

        let mut hosts: BTreeMap<HostId, HostMetadata> = BTreeMap::new();
        for entry in legacy.host_bandwidth_cache {
            hosts.entry(entry.key).or_default().bandwidth = entry.value;
        }
        for entry in legacy.host_country_cache {
            hosts.entry(entry.key).or_default().country = entry.value;
        }
        for entry in legacy.host_max_connection_cache {
            hosts.entry(entry.key).or_default().max_connections = entry.value;
        }
        for entry in legacy.host_country_allowed_cache {
            hosts
                .entry(entry.key)
                .or_default()
                .allowed_countries
                .get_or_insert_with(BTreeSet::new)
                .extend(entry.value);
        }

        Ok(SnapshotContents {
            time: legacy.time.and_then(format_epoch),
            directories,
            repo_index,
            host_netblocks: entries_to_vec(legacy.host_netblock_cache),
            netblock_countries: legacy
                .netblock_country_cache
                .into_iter()
                .map(|e| (e.key, e.value))
                .collect(),
            asn_hosts: entries_to_vec(legacy.host_asn_cache),
            locations: entries_to_vec(legacy.location_cache),
            disabled_repos: legacy
                .disabled_repository_cache
                .into_iter()
                .filter(|e| e.value)
                .map(|e| e.key)
                .collect(),
            repo_redirects: legacy
                .repository_redirect_cache
                .into_iter()
                .map(|e| (e.key, e.value))
                .collect(),
            country_continent_redirects: legacy
                .country_continent_redirect_cache
                .into_iter()
                .map(|e| (e.key, e.value))
                .collect(),
            file_details,
            urls: legacy
                .hc_url_cache
                .into_iter()
                .map(|e| (e.key, e.value))
                .collect(),
            hosts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_version_is_rejected() {
        let result = decode_snapshot(br#"{"version": 9, "snapshot": {}}"#);
        assert!(matches!(result, Err(SnapshotError::UnsupportedVersion(9))));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let result = decode_snapshot(b"not json");
        assert!(matches!(result, Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn test_missing_version_means_legacy() {
        let contents = decode_snapshot(br#"{"Time": 0}"#).unwrap();
        assert_eq!(contents.time.as_deref(), Some("1970-01-01 00:00:00"));
        assert!(contents.directories.is_empty());
    }

    #[test]
    fn test_legacy_bad_repo_key_is_rejected() {
        let doc = br#"{"RepoArchToDirectoryName": [{"key": "norepo", "value": "pub/x"}]}"#;
        assert!(matches!(
            decode_snapshot(doc),
            Err(SnapshotError::InvalidRepoArchKey(_))
        ));
    }

    #[test]
    fn test_legacy_empty_strings_are_unset() {
        let doc = br#"{
            "MirrorListCache": [{"directory": "pub/a", "Subpath": "", "Global": [1],
                                 "ByHostId": [{"key": 1, "value": [10]}]}],
            "FileDetailsCache": [{"directory": "pub/a", "FileDetailsCacheFiles": [
                {"filename": "f", "FileDetails": [{"TimeStamp": 5, "MD5": "", "SHA256": "abc"}]}
            ]}],
            "DisabledRepositoryCache": [{"key": "old", "value": true}, {"key": "new", "value": false}]
        }"#;
        let contents = decode_snapshot(doc).unwrap();
        assert_eq!(contents.directories["pub/a"].subpath, None);
        let detail = &contents.file_details["pub/a"]["f"][0];
        assert_eq!(detail.md5, None);
        assert_eq!(detail.sha256.as_deref(), Some("abc"));
        assert_eq!(
            contents.disabled_repos.into_iter().collect::<Vec<_>>(),
            vec!["old".to_string()]
        );
    }
}
