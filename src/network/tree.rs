//! Radix index keyed on netblocks.

use std::fmt;
use std::net::IpAddr;

use ip_network_table::IpNetworkTable;

use super::netblock::Netblock;
use crate::error_handling::NetblockError;

/// Radix tree mapping netblocks to values.
///
/// Supports all-covering-prefix queries (most specific first) and
/// longest-prefix match.
pub struct NetblockTree<T> {
    table: IpNetworkTable<T>,
}

impl<T> NetblockTree<T> {
    pub fn new() -> Self {
        Self {
            table: IpNetworkTable::new(),
        }
    }

    /// Inserts `value` for `netblock`, returning the value it replaced.
    pub fn insert(&mut self, netblock: Netblock, value: T) -> Result<Option<T>, NetblockError> {
        Ok(self.table.insert(netblock.to_network()?, value))
    }

    /// Number of stored netblocks (IPv4 + IPv6).
    pub fn len(&self) -> usize {
        let (v4, v6) = self.table.len();
        v4 + v6
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every netblock covering `ip`, most specific first.
    pub fn covering(&self, ip: IpAddr) -> Vec<(Netblock, &T)> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut found: Vec<(Netblock, &T)> = self
            .table
            .matches(ip)
            .filter_map(|(network, value)| {
                Netblock::from_network(&network)
                    .ok()
                    .map(|netblock| (netblock, value))
            })
            .collect();
        found.sort_by(|a, b| b.0.prefix_len.cmp(&a.0.prefix_len));
        found
    }

    /// The most specific netblock covering `ip`.
    pub fn best(&self, ip: IpAddr) -> Option<(Netblock, &T)> {
        let (network, value) = self.table.longest_match(ip)?;
        Netblock::from_network(&network)
            .ok()
            .map(|netblock| (netblock, value))
    }
}

impl<T> fmt::Debug for NetblockTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetblockTree")
            .field("len", &self.len())
            .finish()
    }
}

impl<T> Default for NetblockTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(Netblock, T)> for NetblockTree<T> {
    /// Builds a tree; entries whose netblock cannot be indexed are skipped.
    fn from_iter<I: IntoIterator<Item = (Netblock, T)>>(iter: I) -> Self {
        let mut tree = NetblockTree::new();
        for (netblock, value) in iter {
            if let Err(e) = tree.insert(netblock, value) {
                log::warn!("Skipping netblock {}: {}", netblock, e);
            }
        }
        tree
    }
}
