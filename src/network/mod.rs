//! Network topology lookups.
//!
//! This module provides the netblock type, the radix index built on
//! `ip_network_table`, the Network Locator queries used by the resolution
//! pipeline, and ingestion of `CIDR ASN` netblock feeds.

mod feed;
mod locator;
mod netblock;
mod tree;

// Re-export public API
pub use feed::{load_netblock_feed, parse_netblock_feed};
pub use locator::{
    client_country, lookup_best_asn, lookup_country, lookup_covering_hosts, six_to_four_v4,
    teredo_v4,
};
pub use netblock::{compare_netblocks, IpVersion, Netblock};
pub use tree::NetblockTree;
