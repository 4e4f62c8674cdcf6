//! Configuration constants.
//!
//! This module defines the fixed values used by the resolution pipeline and
//! the renderers: tier thresholds, metalink attributes and protocol policy.

/// Default number of mirrors a country (or country + continent) must offer
/// before the pipeline stops looking further afield.
pub const DEFAULT_MINIMUM: usize = 5;

/// Combined size of the netblock, ASN and research-network tiers at which
/// the pipeline may stop early.
pub const NETWORK_TIER_THRESHOLD: usize = 3;

/// Pseudo-country that requests the global mirror set explicitly.
pub const GLOBAL_COUNTRY: &str = "GLOBAL";

/// Protocols kept by the default protocol policy, most preferred first.
pub const PREFERRED_PROTOCOLS: &[&str] = &["https", "http", "ftp"];

// Metalink rendering
/// Preference given to the first host in a metalink resource list
pub const METALINK_PREFERENCE_START: u32 = 100;
/// Preference never drops below this value
pub const METALINK_PREFERENCE_FLOOR: u32 = 1;
pub const METALINK_VERSION: &str = "3.0";
pub const METALINK_NAMESPACE: &str = "http://www.metalinker.org/";
/// Extension namespace bound to the `mm0` prefix
pub const METALINK_EXTENSION_NAMESPACE: &str = "http://fedorahosted.org/mirrormanager";
pub const METALINK_GENERATOR: &str = "mirrormanager";
/// RFC-1123 date format used for the `pubdate` attribute
pub const METALINK_PUBDATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Checksums emitted in a `<verification>` block, in this order
pub const METALINK_HASHES: &[&str] = &["md5", "sha1", "sha256", "sha512"];

// Repository handling
/// Directory appended to a repository directory for metalink requests
pub const REPODATA_DIR: &str = "repodata";
/// File served for repository metalink requests
pub const REPOMD_FILE: &str = "repomd.xml";
/// Architecture forced for repositories whose name mentions sources
pub const SOURCE_ARCH: &str = "source";

// Batch runner
/// Seconds between progress log lines
pub const LOGGING_INTERVAL: u64 = 5;
/// Maximum accepted length of a single request line
pub const MAX_REQUEST_LINE_LENGTH: usize = 4096;
