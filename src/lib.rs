//! mirrorlist_resolver library: ranked mirror lists and metalinks
//!
//! Given a repository/architecture pair or a path, and a client's address
//! and preferences, this library picks the mirrors that should serve the
//! client. Candidates come from a read-only snapshot of the mirror network
//! and are ranked by network proximity, country, continent and bandwidth.
//!
//! # Example
//!
//! ```no_run
//! use mirrorlist_resolver::{run_batch, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     snapshot: std::path::PathBuf::from("mirrorlist_cache.json"),
//!     requests: std::path::PathBuf::from("requests.txt"),
//!     ..Default::default()
//! };
//!
//! let report = run_batch(config).await?;
//! println!("Answered {} requests: {} ok, {} bad",
//!          report.total, report.successful, report.bad_requests);
//! # Ok(())
//! # }
//! ```
//!
//! Single requests can be resolved without the batch runner:
//!
//! ```no_run
//! use mirrorlist_resolver::resolve::{resolve, MirrorRequest, TierStats};
//! use mirrorlist_resolver::snapshot::{load_snapshot, SnapshotSources};
//! use mirrorlist_resolver::ResolverOptions;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let snapshot = load_snapshot(
//!     std::path::Path::new("mirrorlist_cache.json"),
//!     Arc::new(SnapshotSources::default()),
//! )
//! .await?;
//! let request = MirrorRequest::from_query("repo=fedora-40&arch=x86_64&client_ip=192.0.2.7")?;
//! let response = resolve(
//!     &snapshot,
//!     &request,
//!     &ResolverOptions::default(),
//!     &mut rand::rng(),
//!     &TierStats::new(),
//! );
//! println!("{:?}", response.message);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Loading snapshots and the batch runner require a Tokio runtime.

#![warn(missing_docs)]

mod app;
pub mod config;
pub mod error_handling;
pub mod geography;
pub mod geoip;
pub mod initialization;
pub mod network;
pub mod render;
pub mod resolve;
pub mod sampler;
pub mod snapshot;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, ResolverOptions};
pub use run::{run_batch, BatchReport};

// Internal run module (contains the batch resolution loop)
mod run {
    use anyhow::{Context, Result};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::stream::FuturesUnordered;
    use futures::StreamExt;
    use log::{info, warn};
    use serde::Serialize;
    use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
    use tokio_util::sync::CancellationToken;

    use crate::app::{log_progress, print_run_summary, print_tier_statistics, shutdown_gracefully};
    use crate::config::{Config, ResolverOptions, LOGGING_INTERVAL};
    use crate::initialization::{init_request_rng, init_semaphore};
    use crate::render::MirrorListResponse;
    use crate::resolve::{resolve, MirrorRequest, TierStats};
    use crate::snapshot::{load_sources, spawn_hangup_reload, SnapshotStore};

    /// Results of a batch run.
    #[derive(Debug, Clone)]
    pub struct BatchReport {
        /// Number of request lines answered
        pub total: usize,
        /// Responses with status 200
        pub successful: usize,
        /// Responses with status 404 (metalink for an unknown file)
        pub not_found: usize,
        /// Lines that did not decode as a request (status 400)
        pub bad_requests: usize,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// One output line: the input line number and its response.
    #[derive(Serialize)]
    struct ResponseLine<'a> {
        line: usize,
        #[serde(flatten)]
        response: &'a MirrorListResponse,
    }

    /// Resolves every request in `config.requests` against `config.snapshot`.
    ///
    /// Each non-blank, non-`#` line is a URL query string such as
    /// `repo=fedora-40&arch=x86_64&client_ip=192.0.2.7`. Responses are
    /// written to stdout as JSON, one per line, tagged with the input line
    /// number since concurrent requests finish out of order.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - A configured netblock feed, country CSV or GeoIP database cannot be loaded
    /// - The snapshot cannot be read, decoded or indexed
    /// - The request file cannot be opened
    pub async fn run_batch(config: Config) -> Result<BatchReport> {
        let sources = load_sources(&config)
            .await
            .context("Failed to load snapshot sources")?;
        let store = Arc::new(
            SnapshotStore::open(&config.snapshot, sources)
                .await
                .context("Failed to open snapshot")?,
        );
        let options = ResolverOptions::from(&config);

        let reader: Box<dyn AsyncBufRead + Unpin + Send> = if config.requests.as_os_str() == "-" {
            info!("Reading requests from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        } else {
            let file = tokio::fs::File::open(&config.requests)
                .await
                .with_context(|| {
                    format!("Failed to open request file {}", config.requests.display())
                })?;
            Box::new(BufReader::new(file))
        };
        let mut lines = reader.lines();

        let cancel = CancellationToken::new();
        let reload_task = if config.reload_on_hangup {
            Some(
                spawn_hangup_reload(Arc::clone(&store), cancel.child_token())
                    .context("Failed to install SIGHUP handler")?,
            )
        } else {
            None
        };

        let start_time = std::time::Instant::now();
        let semaphore = init_semaphore(config.max_concurrency);
        let stats = Arc::new(TierStats::new());
        let completed = Arc::new(AtomicUsize::new(0));
        let successful = Arc::new(AtomicUsize::new(0));
        let not_found = Arc::new(AtomicUsize::new(0));
        let bad_requests = Arc::new(AtomicUsize::new(0));

        let cancel_logging = cancel.child_token();
        let completed_for_logging = Arc::clone(&completed);
        let bad_for_logging = Arc::clone(&bad_requests);
        let logging_task = Some(tokio::task::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(LOGGING_INTERVAL));
            // The first tick completes immediately
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        log_progress(start_time, &completed_for_logging, &bad_for_logging);
                    }
                    _ = cancel_logging.cancelled() => {
                        break;
                    }
                }
            }
        }));

        let mut tasks = FuturesUnordered::new();
        let mut line_number = 0usize;

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read request line: {e}");
                    break;
                }
            };
            line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("Semaphore closed, skipping line {line_number}");
                    continue;
                }
            };

            let query = trimmed.to_string();
            let store = Arc::clone(&store);
            let stats = Arc::clone(&stats);
            let completed = Arc::clone(&completed);
            let successful = Arc::clone(&successful);
            let not_found = Arc::clone(&not_found);
            let bad_requests = Arc::clone(&bad_requests);
            let line = line_number;

            tasks.push(tokio::spawn(async move {
                let _permit = permit;

                let response = match MirrorRequest::from_query(&query) {
                    Ok(request) => {
                        let snapshot = store.load();
                        let mut rng = init_request_rng();
                        resolve(&snapshot, &request, &options, &mut rng, &stats)
                    }
                    Err(e) => {
                        warn!("Bad request on line {}: {}", line, e);
                        MirrorListResponse::bad_request(&e)
                    }
                };

                match response.returncode {
                    200 => successful.fetch_add(1, Ordering::SeqCst),
                    404 => not_found.fetch_add(1, Ordering::SeqCst),
                    _ => bad_requests.fetch_add(1, Ordering::SeqCst),
                };
                completed.fetch_add(1, Ordering::SeqCst);

                match serde_json::to_string(&ResponseLine {
                    line,
                    response: &response,
                }) {
                    Ok(json) => {
                        let mut out = std::io::stdout().lock();
                        if let Err(e) = writeln!(out, "{}", json) {
                            warn!("Failed to write response for line {}: {}", line, e);
                        }
                    }
                    Err(e) => warn!("Failed to encode response for line {}: {}", line, e),
                }
            }));
        }

        while let Some(task_result) = tasks.next().await {
            if let Err(join_error) = task_result {
                warn!("Request task panicked: {:?}", join_error);
            }
        }

        shutdown_gracefully(cancel, logging_task, reload_task).await;

        log_progress(start_time, &completed, &bad_requests);

        let report = BatchReport {
            total: completed.load(Ordering::SeqCst),
            successful: successful.load(Ordering::SeqCst),
            not_found: not_found.load(Ordering::SeqCst),
            bad_requests: bad_requests.load(Ordering::SeqCst),
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        };

        if config.show_stats {
            print_tier_statistics(&stats);
        }
        print_run_summary(
            report.total,
            report.successful,
            report.bad_requests,
            report.elapsed_seconds,
        );

        Ok(report)
    }
}
