//! The tiered resolution pipeline.

use std::collections::HashSet;

use rand::Rng;

use super::request::MirrorRequest;
use super::stats::TierStats;
use super::tier::Tier;
use super::tiers::{self, NetblockHosts, TierContext, TierHosts};
use crate::config::{ResolverOptions, NETWORK_TIER_THRESHOLD, REPODATA_DIR, REPOMD_FILE, SOURCE_ARCH};
use crate::render::{
    append_path, metalink_document, trim_to_preferred_protocols, trim_to_protocols,
    MirrorListResponse,
};
use crate::sampler::{ordered_netblocks, random_shuffle, weighted_shuffle};
use crate::snapshot::{DirectoryEntry, HostId, Snapshot};

/// The directory (and optional file) a request resolved to.
struct Target<'a> {
    directory: String,
    entry: &'a DirectoryEntry,
    file: Option<String>,
    is_directory: bool,
    header: String,
}

/// Results of every tier that ran.
#[derive(Default)]
struct TierSelection {
    location: TierHosts,
    netblock: NetblockHosts,
    asn: TierHosts,
    research: TierHosts,
    country: TierHosts,
    geoip: TierHosts,
    continent: TierHosts,
    global: TierHosts,
}

/// Resolves one request against `snapshot`.
///
/// Never fails: unknown targets, disabled repositories and missing file
/// details all map to a response. `rng` must belong to this request.
pub fn resolve<R: Rng + ?Sized>(
    snapshot: &Snapshot,
    request: &MirrorRequest,
    options: &ResolverOptions,
    rng: &mut R,
    stats: &TierStats,
) -> MirrorListResponse {
    let target = match resolve_target(snapshot, request) {
        Ok(target) => target,
        Err(response) => return response,
    };

    let ordered = target
        .entry
        .ordered_mirror_list
        .unwrap_or(options.default_ordered_mirrorlist);
    let client_ip = request.client_addr();
    let client_country = client_ip.and_then(|ip| snapshot.client_country(ip));
    log::trace!(
        "IP: {}; COUNTRY: {}; TARGET: {}",
        request.client_ip,
        client_country.as_deref().unwrap_or("N/A"),
        target.directory
    );

    let ctx = TierContext {
        snapshot,
        entry: target.entry,
        client_ip,
        client_country: client_country.as_deref(),
    };
    let mut header = target.header.clone();
    let selection = select_tiers(&ctx, request, ordered, options.minimum, &mut header);
    let ordered_tiers = order_tiers(snapshot, selection, ordered, rng);
    let (hosts, best) = merge_tiers(ordered_tiers);

    stats.record(best);
    log::debug!(
        "mirrorlist: {} found its best mirror from {}",
        client_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "Unknown IP".to_string()),
        best.map(|tier| tier.as_str()).unwrap_or("None")
    );

    let mut hosts_and_urls = append_path(
        snapshot,
        target.entry,
        &hosts,
        target.file.as_deref(),
        target.is_directory,
    );

    let explicit_protocol = request.explicit_protocol();
    if let Some(protocol) = explicit_protocol {
        hosts_and_urls = trim_to_protocols(hosts_and_urls, &[protocol]);
        header.push_str(&format!("protocol = {} ", protocol));
    }

    if request.time {
        if let Some(time) = snapshot.time() {
            header.push_str(&format!("\n# database creation time: {}", time));
        }
    }

    if request.metalink {
        let (code, document) = metalink_document(
            snapshot,
            target.entry,
            &target.directory,
            target.file.as_deref(),
            &hosts_and_urls,
        );
        return MirrorListResponse::metalink(code, document);
    }

    if explicit_protocol.is_none() {
        hosts_and_urls = trim_to_preferred_protocols(hosts_and_urls);
    }
    MirrorListResponse::mirrorlist(header, hosts_and_urls)
}

/// Strips surrounding slashes and collapses repeated ones.
pub fn normalize_path(path: &str) -> String {
    let mut path = path.trim_matches('/').to_string();
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    path
}

fn resolve_target<'a>(
    snapshot: &'a Snapshot,
    request: &MirrorRequest,
) -> Result<Target<'a>, MirrorListResponse> {
    if let Some(path) = &request.path {
        return resolve_path(snapshot, request, path);
    }
    match (&request.repo, &request.arch) {
        (Some(repo), Some(arch)) => resolve_repo(snapshot, request, repo, arch),
        _ => Err(MirrorListResponse::error(
            "# either path=, or repo= and arch= must be specified".to_string(),
            request.metalink,
        )),
    }
}

fn resolve_path<'a>(
    snapshot: &'a Snapshot,
    request: &MirrorRequest,
    path: &str,
) -> Result<Target<'a>, MirrorListResponse> {
    let path = normalize_path(path);
    let header = format!("# path = {} ", path);

    if let Some(entry) = snapshot.directory(&path) {
        return Ok(Target {
            directory: path,
            entry,
            file: None,
            is_directory: true,
            header,
        });
    }

    let (directory, file) = match path.rsplit_once('/') {
        Some((directory, file)) => (directory.to_string(), file.to_string()),
        None => (String::new(), path.clone()),
    };
    match snapshot.directory(&directory) {
        Some(entry) => Ok(Target {
            directory,
            entry,
            file: Some(file),
            is_directory: false,
            header,
        }),
        None => Err(MirrorListResponse::error(
            format!("{}error: invalid path", header),
            request.metalink,
        )),
    }
}

fn resolve_repo<'a>(
    snapshot: &'a Snapshot,
    request: &MirrorRequest,
    repo: &str,
    arch: &str,
) -> Result<Target<'a>, MirrorListResponse> {
    let arch = if repo.contains(SOURCE_ARCH) {
        SOURCE_ARCH
    } else {
        arch
    };
    let repo = snapshot.redirect_repo(repo);
    let header = format!("# repo = {} arch = {} ", repo, arch);

    if snapshot.is_disabled(repo) {
        return Err(MirrorListResponse::error(
            format!("{}repo disabled", header),
            request.metalink,
        ));
    }

    let target = snapshot.repo_directory(repo, arch).and_then(|directory| {
        let (directory, file, is_directory) = if request.metalink {
            (
                format!("{}/{}", directory, REPODATA_DIR),
                Some(REPOMD_FILE.to_string()),
                false,
            )
        } else {
            (directory.to_string(), None, true)
        };
        snapshot.directory(&directory).map(|entry| Target {
            directory,
            entry,
            file,
            is_directory,
            header: header.clone(),
        })
    });

    target.ok_or_else(|| {
        let mut message = format!(
            "{}error: invalid repo or arch\n# following repositories are available:\n",
            header
        );
        for key in snapshot.repo_keys() {
            message.push_str(&format!("# repo={}, arch={}\n", key.repo, key.arch));
        }
        MirrorListResponse::error(message, request.metalink)
    })
}

/// Runs the tiers in order, stopping once one sets `done`.
fn select_tiers(
    ctx: &TierContext<'_>,
    request: &MirrorRequest,
    ordered: bool,
    minimum: usize,
    header: &mut String,
) -> TierSelection {
    let mut selection = TierSelection::default();
    let mut done = false;

    selection.location = tiers::location(ctx, request);
    header.push_str(&selection.location.header);

    let requested = request.requested_countries();

    // An explicit country disables the network tiers
    if requested.is_none() {
        selection.netblock = tiers::netblocks(ctx, request);
        header.push_str(&selection.netblock.header);
        if !selection.netblock.is_empty() && !ordered {
            done = true;
        }

        if !done {
            selection.asn = tiers::asn(ctx);
            header.push_str(&selection.asn.header);
            if selection.asn.len() + selection.netblock.len() >= NETWORK_TIER_THRESHOLD && !ordered {
                done = true;
            }
        }
    }

    if !done {
        selection.research = tiers::research_network(ctx);
        header.push_str(&selection.research.header);
        let network_total =
            selection.research.len() + selection.netblock.len() + selection.asn.len();
        if network_total >= NETWORK_TIER_THRESHOLD && !ordered {
            done = true;
        }
    }

    if !done {
        if let Some(requested) = &requested {
            selection.country = tiers::explicit_country(ctx, requested);
            header.push_str(&selection.country.header);
            // Too few requested-country hosts: widen to their continents
            if selection.country.len() < minimum {
                selection.continent = tiers::continent(ctx, requested);
                header.push_str(&selection.continent.header);
            }
            // Set regardless of the ordered flag
            done = true;
        }
    }

    if !done {
        selection.geoip = tiers::geoip(ctx);
        header.push_str(&selection.geoip.header);
        if selection.geoip.len() >= minimum && !ordered {
            done = true;
        }
    }

    if !done {
        selection.continent = tiers::continent(ctx, &[]);
        header.push_str(&selection.continent.header);
        // Set regardless of the ordered flag
        if selection.geoip.len() + selection.continent.len() >= minimum {
            done = true;
        }
    }

    if !done {
        selection.global = tiers::global(ctx);
        header.push_str(&selection.global.header);
    }

    selection
}

/// Orders each tier's hosts, in pipeline order.
fn order_tiers<R: Rng + ?Sized>(
    snapshot: &Snapshot,
    selection: TierSelection,
    ordered: bool,
    rng: &mut R,
) -> Vec<(Tier, Vec<HostId>)> {
    let weighted = |tier: TierHosts, rng: &mut R| {
        let items = tier
            .hosts
            .into_iter()
            .map(|id| (snapshot.bandwidth(id), id))
            .collect();
        weighted_shuffle(items, rng)
    };

    let location = random_shuffle(selection.location.hosts.into_iter().collect(), rng);
    let netblock = if ordered {
        ordered_netblocks(selection.netblock.matches, rng)
    } else {
        let hosts = selection.netblock.matches.into_iter().map(|(_, id)| id).collect();
        random_shuffle(hosts, rng)
    };

    vec![
        (Tier::Location, location),
        (Tier::Netblock, netblock),
        (Tier::Asn, weighted(selection.asn, rng)),
        (Tier::ResearchNetwork, weighted(selection.research, rng)),
        (Tier::Country, weighted(selection.country, rng)),
        (Tier::GeoIp, weighted(selection.geoip, rng)),
        (Tier::Continent, weighted(selection.continent, rng)),
        (Tier::Global, weighted(selection.global, rng)),
    ]
}

/// Concatenates tier sequences in order, keeping the first occurrence of
/// each host. Also returns the first tier that contributed a host.
pub fn merge_tiers(tiers: Vec<(Tier, Vec<HostId>)>) -> (Vec<HostId>, Option<Tier>) {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    let mut best = None;
    for (tier, hosts) in tiers {
        if best.is_none() && !hosts.is_empty() {
            best = Some(tier);
        }
        for host_id in hosts {
            if seen.insert(host_id) {
                merged.push(host_id);
            }
        }
    }
    (merged, best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let (hosts, best) = merge_tiers(vec![
            (Tier::Location, vec![]),
            (Tier::Netblock, vec![3, 1]),
            (Tier::Asn, vec![1, 2]),
            (Tier::Global, vec![2, 4, 3]),
        ]);
        assert_eq!(hosts, vec![3, 1, 2, 4]);
        assert_eq!(best, Some(Tier::Netblock));
    }

    #[test]
    fn test_merge_of_nothing() {
        let (hosts, best) = merge_tiers(vec![(Tier::Global, vec![])]);
        assert!(hosts.is_empty());
        assert_eq!(best, None);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/pub//fedora///linux/"), "pub/fedora/linux");
        assert_eq!(normalize_path("pub"), "pub");
        assert_eq!(normalize_path("///"), "");
    }
}
