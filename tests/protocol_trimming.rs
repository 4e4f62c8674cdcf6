//! Protocol policy applied to assembled URLs.

mod helpers;

use helpers::*;
use mirrorlist_resolver::render::{trim_to_preferred_protocols, trim_to_protocols, ResponseResults};

fn mixed_host() -> Vec<(u32, Vec<String>)> {
    vec![(
        1,
        vec![
            "rsync://mirror.example.org/fedora/".to_string(),
            "http://mirror.example.org/fedora/".to_string(),
            "ftp://mirror.example.org/fedora/".to_string(),
        ],
    )]
}

#[test]
fn test_preference_picks_http_over_ftp_and_rsync() {
    let trimmed = trim_to_preferred_protocols(mixed_host());
    assert_eq!(
        trimmed,
        vec![(1, vec!["http://mirror.example.org/fedora/".to_string()])]
    );
}

#[test]
fn test_requested_protocol_is_kept() {
    let trimmed = trim_to_protocols(mixed_host(), &["ftp"]);
    assert_eq!(
        trimmed,
        vec![(1, vec!["ftp://mirror.example.org/fedora/".to_string()])]
    );
}

#[test]
fn test_host_without_requested_protocol_is_dropped() {
    assert!(trim_to_protocols(mixed_host(), &["https"]).is_empty());
    let rsync_only = vec![(2, vec!["rsync://m.example.org/x/".to_string()])];
    assert!(trim_to_preferred_protocols(rsync_only).is_empty());
}

#[test]
fn test_first_url_of_requested_protocol_wins() {
    let hosts = vec![(
        4,
        vec![
            "http://a.example.org/x/".to_string(),
            "http://b.example.org/x/".to_string(),
        ],
    )];
    assert_eq!(
        trim_to_protocols(hosts, &["http"]),
        vec![(4, vec!["http://a.example.org/x/".to_string()])]
    );
}

#[test]
fn test_https_preferred_when_present() {
    let hosts = vec![(
        3,
        vec![
            "http://m.example.org/x/".to_string(),
            "https://m.example.org/x/".to_string(),
        ],
    )];
    assert_eq!(
        trim_to_preferred_protocols(hosts),
        vec![(3, vec!["https://m.example.org/x/".to_string()])]
    );
}

#[test]
fn test_rsync_request_through_resolver() {
    let mut contents = fixture_contents();
    contents
        .urls
        .insert(999, "rsync://mirror1.example.org/fedora".to_string());
    contents
        .directories
        .get_mut(DIR)
        .expect("fixture directory")
        .by_host_id
        .get_mut(&1)
        .expect("fixture host")
        .push(999);
    let snapshot = build_snapshot(contents);

    let response = resolve_query(&snapshot, "repo=fedora-40&arch=x86_64&protocol=rsync");
    match &response.results {
        ResponseResults::Mirrors(hosts) => {
            assert_eq!(
                hosts,
                &vec![(1, vec!["rsync://mirror1.example.org/fedora/".to_string()])]
            );
        }
        other => panic!("unexpected results {:?}", other),
    }
}
