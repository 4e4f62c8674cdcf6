use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error parsing a CIDR netblock.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetblockError {
    /// The text is not of the form `address/prefix`.
    #[error("Malformed netblock: {0}")]
    Malformed(String),

    /// The prefix length exceeds the address width.
    #[error("Prefix length {prefix_len} out of range for {netblock}")]
    PrefixOutOfRange { netblock: String, prefix_len: u8 },
}

/// Error types for snapshot decoding and construction.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Reading a snapshot or feed file failed.
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON for its wire version.
    #[error("Snapshot decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The wire version is not one this build understands.
    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    /// A netblock key inside the snapshot does not parse.
    #[error("Invalid netblock in snapshot: {0}")]
    InvalidNetblock(#[from] NetblockError),

    /// A repository index key is not `repo+arch`.
    #[error("Invalid repo/arch key: {0}")]
    InvalidRepoArchKey(String),

    /// A directory lists a host without any URL for it.
    #[error("Directory {directory} references host {host_id} missing from its URL map")]
    InconsistentDirectory { directory: String, host_id: u32 },
}

/// Errors decoding an incoming request.
///
/// These surface as a `400 Bad Request` response from the transport, never
/// from the resolution pipeline itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request names a field the resolver does not know.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A boolean field holds something other than a boolean.
    #[error("invalid boolean '{value}' for field '{field}'")]
    InvalidBool { field: String, value: String },

    /// `path` was combined with `repo`/`arch`.
    #[error("path= cannot be combined with repo= or arch=")]
    ConflictingTarget,

    /// A request line exceeds the accepted length.
    #[error("request of {0} bytes exceeds the maximum length")]
    TooLong(usize),
}
