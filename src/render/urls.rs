//! URL assembly and protocol policy.

use crate::config::PREFERRED_PROTOCOLS;
use crate::snapshot::{DirectoryEntry, HostId, Snapshot};

/// Hosts in priority order with their candidate URLs.
pub type HostUrls = Vec<(HostId, Vec<String>)>;

/// Builds the final URLs of each host, keeping host order.
///
/// Each registered URL gets the directory subpath, then a trailing `/` for
/// a directory listing or the requested file name. Hosts with no URLs in
/// the directory are skipped.
pub fn append_path(
    snapshot: &Snapshot,
    entry: &DirectoryEntry,
    hosts: &[HostId],
    file: Option<&str>,
    is_directory: bool,
) -> HostUrls {
    let mut results = Vec::with_capacity(hosts.len());
    for host_id in hosts {
        let Some(url_ids) = entry.by_host_id.get(host_id) else {
            continue;
        };
        let urls: Vec<String> = url_ids
            .iter()
            .filter_map(|id| snapshot.url(*id))
            .map(|base| build_url(base, entry.subpath.as_deref(), file, is_directory))
            .collect();
        results.push((*host_id, urls));
    }
    results
}

fn build_url(base: &str, subpath: Option<&str>, file: Option<&str>, is_directory: bool) -> String {
    let mut url = base.to_string();
    if let Some(subpath) = subpath.filter(|s| !s.is_empty()) {
        join_segment(&mut url, subpath);
    }
    match file {
        Some(file) => join_segment(&mut url, file),
        None if is_directory && !url.ends_with('/') => url.push('/'),
        None => {}
    }
    url
}

/// Appends `segment` with exactly one `/` between it and `url`.
fn join_segment(url: &mut String, segment: &str) {
    let segment = segment.trim_start_matches('/');
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str(segment);
}

/// The scheme of `url`, if it has one.
pub fn scheme_of(url: &str) -> Option<&str> {
    url.split_once(':').map(|(scheme, _)| scheme)
}

/// Keeps at most one URL per host: the first URL of the most preferred
/// protocol in `protocols`. Hosts offering none of them are dropped.
pub fn trim_to_protocols(hosts_and_urls: HostUrls, protocols: &[&str]) -> HostUrls {
    hosts_and_urls
        .into_iter()
        .filter_map(|(host_id, urls)| {
            protocols.iter().find_map(|protocol| {
                urls.iter()
                    .find(|url| scheme_of(url) == Some(*protocol))
                    .map(|url| (host_id, vec![url.clone()]))
            })
        })
        .collect()
}

/// [`trim_to_protocols`] with the default `https`, `http`, `ftp` preference.
pub fn trim_to_preferred_protocols(hosts_and_urls: HostUrls) -> HostUrls {
    trim_to_protocols(hosts_and_urls, PREFERRED_PROTOCOLS)
}
