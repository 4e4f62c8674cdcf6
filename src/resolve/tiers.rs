//! Tier functions.
//!
//! Each tier looks at the request, the directory entry and the client's
//! country, and returns the header text it contributes together with its
//! candidate hosts. Ordering happens later, in the pipeline.

use std::collections::{BTreeSet, HashSet};
use std::net::IpAddr;

use super::request::MirrorRequest;
use super::tier::Tier;
use crate::config::GLOBAL_COUNTRY;
use crate::network::{lookup_best_asn, lookup_covering_hosts, Netblock};
use crate::snapshot::{DirectoryEntry, HostId, Snapshot};

/// Per-request view shared by all tiers.
pub(crate) struct TierContext<'a> {
    pub snapshot: &'a Snapshot,
    pub entry: &'a DirectoryEntry,
    pub client_ip: Option<IpAddr>,
    pub client_country: Option<&'a str>,
}

impl TierContext<'_> {
    fn serves(&self, host_id: &HostId) -> bool {
        self.entry.by_host_id.contains_key(host_id)
    }

    /// Drops hosts whose allow-list excludes the client's country, for
    /// tiers subject to allow-lists.
    fn allowed(&self, tier: Tier, hosts: BTreeSet<HostId>) -> BTreeSet<HostId> {
        if !tier.applies_allow_list() {
            return hosts;
        }
        hosts
            .into_iter()
            .filter(|id| self.snapshot.host_allows(*id, self.client_country))
            .collect()
    }
}

/// Header text and hosts produced by a tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TierHosts {
    pub header: String,
    pub hosts: BTreeSet<HostId>,
}

impl TierHosts {
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Netblock tier result: distinct `(netblock, host)` matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NetblockHosts {
    pub header: String,
    pub matches: Vec<(Netblock, HostId)>,
}

impl NetblockHosts {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

pub(crate) fn location(ctx: &TierContext<'_>, request: &MirrorRequest) -> TierHosts {
    let Some(name) = request.location.as_deref() else {
        return TierHosts::default();
    };
    let Some(hosts) = ctx.snapshot.location(name) else {
        return TierHosts::default();
    };
    TierHosts {
        header: format!("Using location {} ", name),
        hosts: hosts.iter().copied().filter(|id| ctx.serves(id)).collect(),
    }
}

pub(crate) fn netblocks(ctx: &TierContext<'_>, request: &MirrorRequest) -> NetblockHosts {
    let Some(ip) = ctx.client_ip.filter(|_| request.netblock_enabled()) else {
        return NetblockHosts::default();
    };
    let mut seen = HashSet::new();
    let mut matches = Vec::new();
    for (netblock, hosts) in lookup_covering_hosts(ctx.snapshot.host_netblocks(), ip, None) {
        for host_id in hosts {
            if ctx.serves(&host_id) && seen.insert((netblock, host_id)) {
                matches.push((netblock, host_id));
            }
        }
    }
    let header = if matches.is_empty() {
        String::new()
    } else {
        "Using preferred netblock ".to_string()
    };
    NetblockHosts { header, matches }
}

pub(crate) fn asn(ctx: &TierContext<'_>) -> TierHosts {
    let Some(ip) = ctx.client_ip else {
        return TierHosts::default();
    };
    let Some(asn) = lookup_best_asn(ctx.snapshot.asn_tree(), ip) else {
        return TierHosts::default();
    };
    let hosts: BTreeSet<HostId> = ctx
        .snapshot
        .asn_hosts(asn)
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|id| ctx.serves(id))
        .collect();
    let header = if hosts.is_empty() {
        String::new()
    } else {
        format!("Using ASN {} ", asn)
    };
    TierHosts { header, hosts }
}

pub(crate) fn research_network(ctx: &TierContext<'_>) -> TierHosts {
    let Some(ip) = ctx.client_ip else {
        return TierHosts::default();
    };
    if lookup_best_asn(ctx.snapshot.research_tree(), ip).is_none() {
        return TierHosts::default();
    }
    let hosts = ctx
        .client_country
        .and_then(|country| ctx.entry.by_country_research_net.get(country))
        .cloned()
        .unwrap_or_default();
    TierHosts {
        header: "Using Internet2 ".to_string(),
        hosts: ctx.allowed(Tier::ResearchNetwork, hosts),
    }
}

pub(crate) fn global(ctx: &TierContext<'_>) -> TierHosts {
    TierHosts {
        header: "country = global ".to_string(),
        hosts: ctx.allowed(Tier::Global, ctx.entry.global.clone()),
    }
}

/// Union of the directory's hosts in each of `countries`.
pub(crate) fn country_list(ctx: &TierContext<'_>, tier: Tier, countries: &[String]) -> TierHosts {
    let mut header = String::new();
    let mut hosts = BTreeSet::new();
    for country in countries {
        if let Some(found) = ctx.entry.by_country.get(country) {
            header.push_str(&format!("country = {} ", country));
            hosts.extend(found.iter().copied());
        }
    }
    TierHosts {
        header,
        hosts: ctx.allowed(tier, hosts),
    }
}

pub(crate) fn explicit_country(ctx: &TierContext<'_>, requested: &[String]) -> TierHosts {
    if requested.iter().any(|c| c == GLOBAL_COUNTRY) {
        return global(ctx);
    }
    country_list(ctx, Tier::Country, requested)
}

pub(crate) fn geoip(ctx: &TierContext<'_>) -> TierHosts {
    let Some(country) = ctx.client_country else {
        return TierHosts::default();
    };
    let Some(hosts) = ctx.entry.by_country.get(country) else {
        return TierHosts::default();
    };
    TierHosts {
        header: format!("country = {} ", country),
        hosts: ctx.allowed(Tier::GeoIp, hosts.clone()),
    }
}

/// Hosts in the same continent as `requested`, or as the client when
/// nothing was requested.
pub(crate) fn continent(ctx: &TierContext<'_>, requested: &[String]) -> TierHosts {
    let seeds: Vec<String> = if requested.is_empty() {
        ctx.client_country.map(str::to_string).into_iter().collect()
    } else {
        requested.to_vec()
    };
    let countries = ctx
        .snapshot
        .continents()
        .same_continent_countries(ctx.client_country, &seeds);
    country_list(ctx, Tier::Continent, &countries)
}
