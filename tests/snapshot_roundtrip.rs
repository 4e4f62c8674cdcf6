//! Snapshot wire formats, loading and reloading.

mod helpers;

use std::sync::Arc;

use helpers::*;
use mirrorlist_resolver::snapshot::{
    decode_snapshot, encode_snapshot, load_snapshot, RepoArch, Snapshot, SnapshotStore,
    CURRENT_VERSION,
};

const LEGACY_DOC: &str = r#"{
    "Time": 1790000000,
    "MirrorListCache": [
        {
            "directory": "pub/epel/9/Everything/x86_64",
            "Subpath": "",
            "OrderedMirrorList": false,
            "Global": [1, 2],
            "ByCountry": [
                {"key": "us", "value": [1]},
                {"key": "DE", "value": [2]}
            ],
            "ByCountryInternet2": [],
            "ByHostId": [
                {"key": 1, "value": [10]},
                {"key": 2, "value": [20, 21]}
            ]
        }
    ],
    "HostNetblockCache": [{"key": "192.0.2.0/24", "value": [1]}],
    "NetblockCountryCache": [{"key": "198.51.100.0/24", "value": "DE"}],
    "HostAsnCache": [{"key": 64500, "value": [2]}],
    "LocationCache": [],
    "HCUrlCache": [
        {"key": 10, "value": "http://one.example.org/epel/9/Everything/x86_64"},
        {"key": 20, "value": "http://two.example.org/epel/9/Everything/x86_64"},
        {"key": 21, "value": "https://two.example.org/epel/9/Everything/x86_64"}
    ],
    "FileDetailsCache": [
        {
            "directory": "pub/epel/9/Everything/x86_64/repodata",
            "FileDetailsCacheFiles": [
                {
                    "filename": "repomd.xml",
                    "FileDetails": [
                        {"TimeStamp": 1790000000, "Size": 3000, "SHA256": "ee", "MD5": ""}
                    ]
                }
            ]
        }
    ],
    "DisabledRepositoryCache": [
        {"key": "epel-8", "value": true},
        {"key": "epel-9", "value": false}
    ],
    "CountryContinentRedirectCache": [{"key": "il", "value": "eu"}],
    "RepositoryRedirectCache": [{"key": "epel-old", "value": "epel-9"}],
    "RepoArchToDirectoryName": [
        {"key": "epel-9+x86_64", "value": "pub/epel/9/Everything/x86_64"}
    ],
    "HostMaxConnectionCache": [{"key": 1, "value": 4}],
    "HostCountryCache": [{"key": 1, "value": "US"}, {"key": 2, "value": "de"}],
    "HostBandwidthCache": [{"key": 1, "value": 100}, {"key": 2, "value": 1000}],
    "HostCountryAllowedCache": [{"key": 2, "value": ["DE", "AT"]}]
}"#;

#[test]
fn test_canonical_round_trip_preserves_indexes() {
    let contents = fixture_contents();
    let bytes = encode_snapshot(&contents).expect("encode");

    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(value["version"], CURRENT_VERSION);

    let decoded = decode_snapshot(&bytes).expect("decode");
    assert_eq!(decoded.directories, contents.directories);
    assert_eq!(decoded.repo_index, contents.repo_index);
    assert_eq!(decoded.hosts, contents.hosts);
    assert_eq!(decoded, contents);
}

#[test]
fn test_legacy_document_decodes() {
    let contents = decode_snapshot(LEGACY_DOC.as_bytes()).expect("legacy decode");

    assert_eq!(contents.time.as_deref(), Some("2026-09-21 14:13:20"));
    let entry = &contents.directories["pub/epel/9/Everything/x86_64"];
    assert_eq!(entry.global, [1, 2].into());
    assert_eq!(entry.by_host_id[&2], vec![20, 21]);
    assert_eq!(entry.subpath, None);
    assert_eq!(entry.ordered_mirror_list, Some(false));

    assert_eq!(
        contents.repo_index[&RepoArch::new("epel-9", "x86_64")],
        "pub/epel/9/Everything/x86_64"
    );
    assert!(contents.disabled_repos.contains("epel-8"));
    assert!(!contents.disabled_repos.contains("epel-9"));
    assert_eq!(contents.repo_redirects["epel-old"], "epel-9");
    assert_eq!(contents.asn_hosts[&64500], vec![2]);

    let host = &contents.hosts[&2];
    assert_eq!(host.bandwidth, 1000);
    assert_eq!(
        host.allowed_countries.as_ref().map(|c| c.len()),
        Some(2)
    );
    assert_eq!(contents.hosts[&1].max_connections, 4);

    let detail = &contents.file_details["pub/epel/9/Everything/x86_64/repodata"]["repomd.xml"][0];
    assert_eq!(detail.size, Some(3000));
    assert_eq!(detail.sha256.as_deref(), Some("ee"));
    assert_eq!(detail.md5, None);
}

#[test]
fn test_legacy_snapshot_builds_with_upper_case_countries() {
    let contents = decode_snapshot(LEGACY_DOC.as_bytes()).expect("legacy decode");
    let snapshot = Snapshot::build(contents, &fixture_sources()).expect("build");

    let entry = snapshot
        .directory("pub/epel/9/Everything/x86_64")
        .expect("directory");
    assert!(entry.by_country.contains_key("US"));
    assert_eq!(snapshot.host(2).map(|h| h.country.as_str()), Some("DE"));
    assert_eq!(snapshot.continents().continent_of("IL"), Some("EU"));

    let response = resolve_query(&snapshot, "repo=epel-old&arch=x86_64&client_ip=192.0.2.1");
    assert!(message(&response).starts_with("# repo = epel-9 arch = x86_64 "));
    assert_eq!(response.host_ids()[0], 1);
}

#[test]
fn test_inconsistent_directory_is_rejected() {
    let mut contents = fixture_contents();
    contents
        .directories
        .get_mut(DIR)
        .expect("fixture directory")
        .global
        .insert(99);
    assert!(Snapshot::build(contents, &fixture_sources()).is_err());
}

#[tokio::test]
async fn test_load_and_reload_from_disk() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("mirrorlist_cache.json");
    std::fs::write(&path, encode_snapshot(&fixture_contents()).expect("encode")).expect("write");

    let sources = Arc::new(fixture_sources());
    let snapshot = load_snapshot(&path, Arc::clone(&sources))
        .await
        .expect("load");
    assert_eq!(snapshot.time(), Some(CREATED));

    let store = SnapshotStore::open(&path, fixture_sources())
        .await
        .expect("open");
    let before = store.load();

    // A broken file leaves the published snapshot in place
    std::fs::write(&path, b"{ not json").expect("write");
    assert!(store.reload().await.is_err());
    assert_eq!(store.load().time(), Some(CREATED));

    std::fs::write(&path, LEGACY_DOC).expect("write");
    store.reload().await.expect("reload");
    let after = store.load();
    assert_ne!(after.time(), before.time());
    assert!(after.directory("pub/epel/9/Everything/x86_64").is_some());
    // Readers holding the old snapshot keep a consistent view
    assert!(before.directory(DIR).is_some());
}
