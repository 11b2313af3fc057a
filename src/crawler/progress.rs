//! Shared progress counters for a crawl run.
//!
//! The `{ processed, succeeded, total }` triple is the only mutable state
//! shared across the run. Every read-modify-write — including the progress
//! log line — happens inside one mutex critical section, so concurrent
//! outcomes can neither interleave log output nor lose an update. Workers
//! never touch the counters directly; the dispatcher folds each outcome in
//! exactly once.

use crate::types::FetchResult;
use tokio::sync::Mutex;

/// A consistent view of the counters, taken inside the critical section.
///
/// Invariant: `succeeded <= processed <= total` at every observation point;
/// `processed == total` exactly once all tasks have reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Tasks that have reached a terminal state
    pub processed: usize,
    /// Tasks that wrote a chapter file
    pub succeeded: usize,
    /// Tasks submitted to the run
    pub total: usize,
}

#[derive(Debug, Default)]
struct Counters {
    processed: usize,
    succeeded: usize,
    total: usize,
}

/// Dispatcher-owned counter state.
#[derive(Debug, Default)]
pub(crate) struct ProgressTracker {
    inner: Mutex<Counters>,
}

impl ProgressTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reset the counters for a new run of `total` tasks.
    pub(crate) async fn begin_run(&self, total: usize) {
        let mut counters = self.inner.lock().await;
        *counters = Counters {
            processed: 0,
            succeeded: 0,
            total,
        };
    }

    /// Fold one terminal outcome into the counters and log the progress line,
    /// all inside the critical section.
    pub(crate) async fn record_outcome(&self, result: &FetchResult) -> ProgressSnapshot {
        let mut counters = self.inner.lock().await;
        counters.processed += 1;
        if result.success {
            counters.succeeded += 1;
        }
        let snapshot = ProgressSnapshot {
            processed: counters.processed,
            succeeded: counters.succeeded,
            total: counters.total,
        };
        if result.success {
            tracing::info!(
                index = result.index,
                title = %result.title,
                processed = snapshot.processed,
                total = snapshot.total,
                "chapter saved"
            );
        } else {
            tracing::warn!(
                index = result.index,
                diagnostic = result.diagnostic.as_deref().unwrap_or("unknown"),
                processed = snapshot.processed,
                total = snapshot.total,
                "task failed"
            );
        }
        snapshot
    }

    /// Current counters.
    pub(crate) async fn snapshot(&self) -> ProgressSnapshot {
        let counters = self.inner.lock().await;
        ProgressSnapshot {
            processed: counters.processed,
            succeeded: counters.succeeded,
            total: counters.total,
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn outcomes_move_counters_monotonically() {
        let tracker = ProgressTracker::new();
        tracker.begin_run(3).await;

        let s1 = tracker
            .record_outcome(&FetchResult::success(0, "one"))
            .await;
        assert_eq!((s1.processed, s1.succeeded), (1, 1));

        let s2 = tracker
            .record_outcome(&FetchResult::failure(1, "request timed out"))
            .await;
        assert_eq!((s2.processed, s2.succeeded), (2, 1));

        let s3 = tracker
            .record_outcome(&FetchResult::success(2, "three"))
            .await;
        assert_eq!((s3.processed, s3.succeeded), (3, 2));
        assert_eq!(s3.total, 3);
    }

    #[tokio::test]
    async fn invariant_holds_under_concurrent_updates() {
        use std::sync::Arc;

        let tracker = Arc::new(ProgressTracker::new());
        tracker.begin_run(32).await;

        let mut handles = Vec::new();
        for index in 0..32 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                let result = if index % 3 == 0 {
                    FetchResult::failure(index, "connection error")
                } else {
                    FetchResult::success(index, format!("chapter {index}"))
                };
                let snapshot = tracker.record_outcome(&result).await;
                assert!(snapshot.succeeded <= snapshot.processed);
                assert!(snapshot.processed <= snapshot.total);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let end = tracker.snapshot().await;
        assert_eq!(end.processed, 32);
        assert_eq!(end.succeeded, 21);
    }

    #[tokio::test]
    async fn begin_run_resets_previous_state() {
        let tracker = ProgressTracker::new();
        tracker.begin_run(2).await;
        tracker
            .record_outcome(&FetchResult::success(0, "one"))
            .await;

        tracker.begin_run(5).await;
        let snapshot = tracker.snapshot().await;
        assert_eq!((snapshot.processed, snapshot.succeeded, snapshot.total), (0, 0, 5));
    }
}
