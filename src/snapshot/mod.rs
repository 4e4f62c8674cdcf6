//! Snapshot Cache.
//!
//! A snapshot holds every index the resolver consults: directories,
//! repository mappings, host metadata, URL table, file details and the
//! netblock trees. It is decoded from one of the supported wire formats,
//! indexed once, and published through [`SnapshotStore`]. Nothing inside a
//! built snapshot is ever mutated; a reload builds a new one and swaps it in.

mod index;
mod loader;
mod store;
mod types;
mod wire;

pub use index::{Snapshot, SnapshotSources};
pub use loader::{load_snapshot, load_sources, read_contents};
pub use store::{spawn_hangup_reload, SnapshotStore};
pub use types::{
    DirectoryEntry, FileDetail, HostId, HostMetadata, RepoArch, SnapshotContents, UrlId,
};
pub use wire::{
    decode_snapshot, encode_snapshot, CanonicalDecoder, LegacyDecoder, SnapshotDecoder,
    CURRENT_VERSION,
};
