//! Network Locator: maps a client address to netblocks, ASNs and a country.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::netblock::Netblock;
use super::tree::NetblockTree;
use crate::geoip::GeoIpDatabase;
use crate::snapshot::HostId;

/// Every netblock covering `ip` with its host ids, most specific first.
///
/// With `max_results`, stops once the accumulated number of host ids reaches
/// the cap (the block that crosses it is still included).
pub fn lookup_covering_hosts(
    tree: &NetblockTree<Vec<HostId>>,
    ip: IpAddr,
    max_results: Option<usize>,
) -> Vec<(Netblock, Vec<HostId>)> {
    let mut results = Vec::new();
    let mut found = 0usize;
    for (netblock, hosts) in tree.covering(ip) {
        found += hosts.len();
        results.push((netblock, hosts.clone()));
        if max_results.is_some_and(|max| found >= max) {
            break;
        }
    }
    results
}

/// Autonomous system of the most specific netblock covering `ip`.
pub fn lookup_best_asn(tree: &NetblockTree<u32>, ip: IpAddr) -> Option<u32> {
    tree.best(ip).map(|(_, asn)| *asn)
}

/// Country of the first (most specific) netblock covering `ip`.
pub fn lookup_country(tree: &NetblockTree<String>, ip: IpAddr) -> Option<String> {
    tree.covering(ip)
        .into_iter()
        .next()
        .map(|(_, country)| country.clone())
}

/// Resolves the client's country.
///
/// Tries the netblock→country index, then the GeoIP database. An IPv6
/// address with no answer is retried as the IPv4 address embedded by 6to4
/// or Teredo, whichever applies first.
pub fn client_country(
    tree: &NetblockTree<String>,
    geoip: Option<&GeoIpDatabase>,
    ip: IpAddr,
) -> Option<String> {
    let direct = |addr: IpAddr| {
        lookup_country(tree, addr).or_else(|| geoip.and_then(|db| db.country(addr)))
    };

    if let Some(country) = direct(ip) {
        return Some(country);
    }

    let IpAddr::V6(v6) = ip else {
        return None;
    };
    let embedded = six_to_four_v4(&v6).or_else(|| teredo_v4(&v6))?;
    log::trace!("Retrying country lookup for {} as {}", ip, embedded);
    direct(IpAddr::V4(embedded))
}

/// IPv4 address embedded in a 6to4 (`2002::/16`) address.
pub fn six_to_four_v4(ip: &Ipv6Addr) -> Option<Ipv4Addr> {
    let segments = ip.segments();
    if segments[0] != 0x2002 {
        return None;
    }
    let [a, b] = segments[1].to_be_bytes();
    let [c, d] = segments[2].to_be_bytes();
    Some(Ipv4Addr::new(a, b, c, d))
}

/// Obfuscated client IPv4 address of a Teredo address.
///
/// Accepts the standard `2001::/32` prefix and the pre-standard
/// `3ffe:831f::/32`; the last two hextets hold the address XORed with `0xff`.
pub fn teredo_v4(ip: &Ipv6Addr) -> Option<Ipv4Addr> {
    let segments = ip.segments();
    let teredo_std = segments[0] == 0x2001 && segments[1] == 0x0000;
    let teredo_xp = segments[0] == 0x3ffe && segments[1] == 0x831f;
    if !teredo_std && !teredo_xp {
        return None;
    }
    let [a, b] = segments[6].to_be_bytes();
    let [c, d] = segments[7].to_be_bytes();
    Some(Ipv4Addr::new(a ^ 0xff, b ^ 0xff, c ^ 0xff, d ^ 0xff))
}
