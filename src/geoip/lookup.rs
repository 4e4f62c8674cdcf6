//! Country lookups against a loaded GeoIP database.

use maxminddb::Reader;
use std::net::IpAddr;

use super::types::GeoIpMetadata;

/// A loaded GeoIP Country database.
pub struct GeoIpDatabase {
    reader: Reader<Vec<u8>>,
    metadata: GeoIpMetadata,
}

impl GeoIpDatabase {
    pub(crate) fn new(reader: Reader<Vec<u8>>, metadata: GeoIpMetadata) -> Self {
        Self { reader, metadata }
    }

    pub fn metadata(&self) -> &GeoIpMetadata {
        &self.metadata
    }

    /// Upper-case ISO country code for `ip`, or `None` when the database has
    /// no record for it.
    pub fn country(&self, ip: IpAddr) -> Option<String> {
        // maxminddb 0.27 API: lookup() returns Result<LookupResult, MaxMindDbError>
        let lookup = self.reader.lookup(ip).ok()?;
        if !lookup.has_data() {
            return None;
        }
        let record: maxminddb::geoip2::Country = match lookup.decode() {
            Ok(Some(record)) => record,
            Ok(None) | Err(_) => return None,
        };
        record.country.iso_code.map(|code| code.to_uppercase())
    }
}

impl std::fmt::Debug for GeoIpDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoIpDatabase")
            .field("metadata", &self.metadata)
            .finish()
    }
}
