//! Core crawler implementation split into focused submodules.
//!
//! The [`Crawler`] struct and its methods are organized by domain:
//! - [`progress`] - Shared progress counters under a single lock
//! - [`worker`] - Single-task fetch/clean/name/write lifecycle
//! - [`dispatch`] - Bounded worker pool and outcome aggregation

mod dispatch;
pub(crate) mod progress;
mod worker;

pub use progress::ProgressSnapshot;


use std::sync::Arc;

use crate::cleaner::Cleaner;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{HttpPageFetcher, PageFetcher};
use crate::types::Event;
use progress::ProgressTracker;

/// Size of the event broadcast buffer; subscribers lagging further than this
/// receive `RecvError::Lagged`.
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// The concurrent fetch-extract-persist pipeline.
///
/// Holds the validated configuration, the compiled extraction pipeline, the
/// transport, and the event channel. A run is started with
/// [`Crawler::run`] or [`Crawler::run_until`]; progress can be observed
/// through [`Crawler::subscribe`] and [`Crawler::progress`].
pub struct Crawler {
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
    cleaner: Arc<Cleaner>,
    event_tx: tokio::sync::broadcast::Sender<Event>,
    progress: Arc<ProgressTracker>,
}

impl Crawler {
    /// Create a crawler with the HTTP transport.
    ///
    /// Validates the configuration and compiles the extraction profile.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Arc::new(HttpPageFetcher::new(&config.crawl)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Create a crawler with a custom transport.
    ///
    /// Useful for embedding (caching transports, test doubles).
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        config.validate()?;
        let cleaner = Arc::new(Cleaner::new(&config.extract)?);
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            cleaner,
            event_tx,
            progress: Arc::new(ProgressTracker::new()),
        })
    }

    /// Subscribe to crawl events.
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current progress counters (consistent snapshot).
    pub async fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot().await
    }

    /// The crawler's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Emit an event to all subscribers; dropped when nobody listens.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
