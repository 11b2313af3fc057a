//! # chapter-dl
//!
//! Concurrent chapter crawler: fetch a fixed list of pages, strip the
//! boilerplate out of each one, and persist every chapter as a uniquely
//! named text file.
//!
//! ## Design Philosophy
//!
//! chapter-dl is designed to be:
//! - **Polite by default** - fixed per-request delay, bounded worker pool
//! - **Failure-tolerant** - a failed page never aborts the run; it only
//!   shows up in the final tally
//! - **Observable** - consumers subscribe to events and progress snapshots,
//!   no polling of the filesystem required
//! - **Profile-driven** - the extraction selectors and boilerplate markers
//!   are configuration, not code
//!
//! ## Quick Start
//!
//! ```no_run
//! use chapter_dl::{Config, Crawler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         seeds: vec![
//!             "https://novel.example/chapter/1.html".to_string(),
//!             "https://novel.example/chapter/2.html".to_string(),
//!         ],
//!         ..Default::default()
//!     };
//!
//!     let crawler = Crawler::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = crawler.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = crawler.run().await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Book assembly (chapter concatenation)
pub mod book;
/// Markup cleaning pipeline
pub mod cleaner;
/// Configuration types
pub mod config;
/// Core crawler implementation (decomposed into focused submodules)
pub mod crawler;
/// Error types
pub mod error;
/// Page fetching (transport abstraction + HTTP implementation)
pub mod fetch;
/// Seed harvesting from saved index pages
pub mod harvest;
/// Destination naming (sanitization + collision handling)
pub mod naming;
/// Chinese-numeral chapter-name normalization
pub mod numerals;
/// Text statistics for chapter files
pub mod stats;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use cleaner::Cleaner;
pub use config::{Config, CrawlConfig, ExtractConfig, HarvestConfig};
pub use crawler::{Crawler, ProgressSnapshot};
pub use error::{Error, FetchError, Result};
pub use fetch::{HttpPageFetcher, PageFetcher};
pub use types::{Event, ExtractedRecord, FetchResult, Summary, Task};

/// Helper function to run a crawl with graceful signal handling.
///
/// Starts the crawl and cancels it when a termination signal arrives; an
/// interrupted run reports the counts gathered so far instead of crashing.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(crawler: &Crawler) -> Result<Summary> {
    let cancel = tokio_util::sync::CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_cancel.cancel();
    });
    crawler.run_until(cancel).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers,
    // tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
