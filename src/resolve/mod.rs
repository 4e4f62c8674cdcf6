//! Mirror resolution.
//!
//! A request is mapped to a directory, then run through the tiers in fixed
//! order (location, netblock, ASN, research network, explicit country,
//! GeoIP country, continent, global) until one of them decides the result
//! is good enough. Each tier's hosts are ordered by the sampler and the
//! tiers are merged, first occurrence wins, before rendering.

mod pipeline;
mod request;
mod stats;
mod tier;
mod tiers;

pub use pipeline::{merge_tiers, normalize_path, resolve};
pub use request::MirrorRequest;
pub use stats::TierStats;
pub use tier::Tier;
