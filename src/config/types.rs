//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::DEFAULT_MINIMUM;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Application configuration.
///
/// Parsed from the command line by the binary, or constructed directly by
/// library users.
///
/// # Examples
///
/// ```no_run
/// use mirrorlist_resolver::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     snapshot: PathBuf::from("mirrorlist_cache.json"),
///     minimum: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mirrorlist_resolver",
    about = "Resolve ranked mirror lists and metalinks from a mirror snapshot"
)]
pub struct Config {
    /// Snapshot file produced by the snapshot builder (JSON, v1 or v2)
    pub snapshot: PathBuf,

    /// File with one query-encoded request per line ("-" reads stdin)
    #[arg(long, default_value = "-")]
    pub requests: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Mirrors a country (or country + continent) must offer before stopping
    #[arg(short, long, default_value_t = DEFAULT_MINIMUM)]
    pub minimum: usize,

    /// Research-network netblock feed ("CIDR ASN" per line)
    #[arg(long)]
    pub research_netblocks: Option<PathBuf>,

    /// Global BGP netblock feed ("CIDR ASN" per line)
    #[arg(long)]
    pub global_netblocks: Option<PathBuf>,

    /// Country to continent CSV replacing the built-in table
    #[arg(long = "cccsv")]
    pub country_continent_csv: Option<PathBuf>,

    /// MaxMind GeoLite2 Country database used when no netblock matches
    #[arg(long)]
    pub geoip: Option<PathBuf>,

    /// Maximum concurrently resolved requests
    #[arg(long, default_value_t = 30)]
    pub max_concurrency: usize,

    /// Treat directories without an explicit flag as ordered mirror lists
    #[arg(long)]
    pub default_ordered_mirrorlist: bool,

    /// Reload the snapshot when SIGHUP is received
    #[arg(long)]
    pub reload_on_hangup: bool,

    /// Print per-tier statistics at the end of the run
    #[arg(long)]
    pub show_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from("mirrorlist_cache.json"),
            requests: PathBuf::from("-"),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            minimum: DEFAULT_MINIMUM,
            research_netblocks: None,
            global_netblocks: None,
            country_continent_csv: None,
            geoip: None,
            max_concurrency: 30,
            default_ordered_mirrorlist: false,
            reload_on_hangup: false,
            show_stats: false,
        }
    }
}

/// Options consulted by the resolution pipeline for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Country/continent result size that stops the search
    pub minimum: usize,
    /// Ordered-list flag assumed for directories that do not carry one
    pub default_ordered_mirrorlist: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            minimum: DEFAULT_MINIMUM,
            default_ordered_mirrorlist: false,
        }
    }
}

impl From<&Config> for ResolverOptions {
    fn from(config: &Config) -> Self {
        Self {
            minimum: config.minimum,
            default_ordered_mirrorlist: config.default_ordered_mirrorlist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.minimum, 5);
        assert_eq!(config.max_concurrency, 30);
        assert_eq!(config.requests, PathBuf::from("-"));
        assert!(!config.reload_on_hangup);
        assert!(!config.default_ordered_mirrorlist);
        assert!(config.geoip.is_none());
    }

    #[test]
    fn test_config_parses_minimum_and_feeds() {
        let config = Config::try_parse_from([
            "mirrorlist_resolver",
            "cache.json",
            "--minimum",
            "2",
            "--research-netblocks",
            "i2.txt",
            "--cccsv",
            "cc.csv",
        ])
        .expect("arguments should parse");
        assert_eq!(config.snapshot, PathBuf::from("cache.json"));
        assert_eq!(config.minimum, 2);
        assert_eq!(config.research_netblocks, Some(PathBuf::from("i2.txt")));
        assert_eq!(config.country_continent_csv, Some(PathBuf::from("cc.csv")));
    }

    #[test]
    fn test_resolver_options_from_config() {
        let config = Config {
            minimum: 7,
            default_ordered_mirrorlist: true,
            ..Default::default()
        };
        let options = ResolverOptions::from(&config);
        assert_eq!(options.minimum, 7);
        assert!(options.default_ordered_mirrorlist);
    }
}
