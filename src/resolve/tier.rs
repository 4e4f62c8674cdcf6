//! Resolution tiers.

use strum_macros::EnumIter as EnumIterMacro;

/// One stage of the resolution pipeline, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIterMacro)]
pub enum Tier {
    Location,
    Netblock,
    Asn,
    ResearchNetwork,
    Country,
    GeoIp,
    Continent,
    Global,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Tier {
    /// Short name used in logs and statistics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Location => "location",
            Tier::Netblock => "netblocks",
            Tier::Asn => "asn",
            Tier::ResearchNetwork => "I2",
            Tier::Country => "country",
            Tier::GeoIp => "geoip",
            Tier::Continent => "continent",
            Tier::Global => "global",
        }
    }

    /// Whether hosts of this tier are filtered by their country allow-list.
    pub fn applies_allow_list(&self) -> bool {
        !matches!(self, Tier::Location | Tier::Netblock | Tier::Asn)
    }
}
