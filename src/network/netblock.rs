//! CIDR netblocks as explicit `(version, prefix length, address bytes)` tuples.

use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use ip_network::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::error_handling::NetblockError;

/// IP protocol version of a netblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Address width in bits.
    pub fn bits(self) -> u8 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    fn rank(self) -> u8 {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }
}

/// A CIDR block.
///
/// The address is stored with host bits cleared; IPv4 addresses occupy the
/// first four bytes of `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Netblock {
    pub version: IpVersion,
    pub prefix_len: u8,
    pub address: [u8; 16],
}

impl Netblock {
    /// Builds a netblock, clearing any host bits of `addr`.
    pub fn new(addr: IpAddr, prefix_len: u8) -> Result<Self, NetblockError> {
        let (version, mut address) = match addr {
            IpAddr::V4(v4) => {
                let mut bytes = [0u8; 16];
                bytes[..4].copy_from_slice(&v4.octets());
                (IpVersion::V4, bytes)
            }
            IpAddr::V6(v6) => (IpVersion::V6, v6.octets()),
        };
        if prefix_len > version.bits() {
            return Err(NetblockError::PrefixOutOfRange {
                netblock: format!("{}/{}", addr, prefix_len),
                prefix_len,
            });
        }
        mask_host_bits(&mut address, prefix_len, version.bits());
        Ok(Self {
            version,
            prefix_len,
            address,
        })
    }

    /// Network address of the block.
    pub fn addr(&self) -> IpAddr {
        match self.version {
            IpVersion::V4 => IpAddr::V4(Ipv4Addr::new(
                self.address[0],
                self.address[1],
                self.address[2],
                self.address[3],
            )),
            IpVersion::V6 => IpAddr::V6(Ipv6Addr::from(self.address)),
        }
    }

    /// Number of host bits, i.e. log2 of the address-space size.
    ///
    /// Comparing host bits orders blocks by size without overflowing on `::/0`.
    pub fn host_bits(&self) -> u8 {
        self.version.bits() - self.prefix_len
    }

    pub fn is_ipv6(&self) -> bool {
        self.version == IpVersion::V6
    }

    /// Whether `ip` falls inside this block.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match Netblock::new(ip, self.prefix_len) {
            Ok(masked) => masked.version == self.version && masked.address == self.address,
            Err(_) => false,
        }
    }

    /// Converts to the radix table's network type.
    pub(crate) fn to_network(self) -> Result<IpNetwork, NetblockError> {
        IpNetwork::new(self.addr(), self.prefix_len)
            .map_err(|e| NetblockError::Malformed(format!("{}: {}", self, e)))
    }

    pub(crate) fn from_network(network: &IpNetwork) -> Result<Self, NetblockError> {
        Netblock::new(network.network_address(), network.netmask())
    }
}

/// Total order over netblocks: version, then address bytes, then prefix length.
pub fn compare_netblocks(a: &Netblock, b: &Netblock) -> Ordering {
    a.version
        .rank()
        .cmp(&b.version.rank())
        .then_with(|| a.address.cmp(&b.address))
        .then_with(|| a.prefix_len.cmp(&b.prefix_len))
}

fn mask_host_bits(address: &mut [u8; 16], prefix_len: u8, width: u8) {
    for bit in prefix_len..width {
        let byte = usize::from(bit / 8);
        address[byte] &= !(0x80u8 >> (bit % 8));
    }
}

impl FromStr for Netblock {
    type Err = NetblockError;

    /// Parses `address/prefix`; a bare address is a host route.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr_part, prefix_part) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };
        let addr: IpAddr = addr_part
            .parse()
            .map_err(|_| NetblockError::Malformed(s.to_string()))?;
        let prefix_len = match prefix_part {
            Some(p) => p
                .parse::<u8>()
                .map_err(|_| NetblockError::Malformed(s.to_string()))?,
            None => match addr {
                IpAddr::V4(_) => 32,
                IpAddr::V6(_) => 128,
            },
        };
        Netblock::new(addr, prefix_len)
    }
}

impl fmt::Display for Netblock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr(), self.prefix_len)
    }
}

impl TryFrom<String> for Netblock {
    type Error = NetblockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Netblock> for String {
    fn from(value: Netblock) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clears_host_bits() {
        let nb: Netblock = "192.168.17.5/16".parse().unwrap();
        assert_eq!(nb.to_string(), "192.168.0.0/16");
        assert_eq!(nb.version, IpVersion::V4);
        assert_eq!(nb.host_bits(), 16);
    }

    #[test]
    fn test_parse_ipv6() {
        let nb: Netblock = "2001:db8:abcd::1/48".parse().unwrap();
        assert_eq!(nb.to_string(), "2001:db8:abcd::/48");
        assert!(nb.is_ipv6());
        assert_eq!(nb.host_bits(), 80);
    }

    #[test]
    fn test_parse_bare_address_is_host_route() {
        let nb: Netblock = "10.1.2.3".parse().unwrap();
        assert_eq!(nb.prefix_len, 32);
        assert_eq!(nb.host_bits(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-netblock".parse::<Netblock>().is_err());
        assert!("10.0.0.0/abc".parse::<Netblock>().is_err());
        assert!(matches!(
            "10.0.0.0/33".parse::<Netblock>(),
            Err(NetblockError::PrefixOutOfRange { prefix_len: 33, .. })
        ));
    }

    #[test]
    fn test_contains() {
        let nb: Netblock = "10.0.0.0/8".parse().unwrap();
        assert!(nb.contains("10.200.3.4".parse().unwrap()));
        assert!(!nb.contains("11.0.0.1".parse().unwrap()));
        assert!(!nb.contains("::a00:1".parse().unwrap()));
    }

    #[test]
    fn test_compare_netblocks_orders_version_address_prefix() {
        let v4_a: Netblock = "10.0.0.0/8".parse().unwrap();
        let v4_a_long: Netblock = "10.0.0.0/16".parse().unwrap();
        let v4_b: Netblock = "11.0.0.0/8".parse().unwrap();
        let v6: Netblock = "::/0".parse().unwrap();

        assert_eq!(compare_netblocks(&v4_a, &v4_a_long), Ordering::Less);
        assert_eq!(compare_netblocks(&v4_a_long, &v4_b), Ordering::Less);
        assert_eq!(compare_netblocks(&v4_b, &v6), Ordering::Less);
        assert_eq!(compare_netblocks(&v6, &v6), Ordering::Equal);
    }

    #[test]
    fn test_serde_as_string() {
        let nb: Netblock = "2002::/16".parse().unwrap();
        let json = serde_json::to_string(&nb).unwrap();
        assert_eq!(json, "\"2002::/16\"");
        let back: Netblock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, nb);
    }
}
