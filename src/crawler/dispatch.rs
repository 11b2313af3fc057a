//! Dispatcher — submits every seed to a bounded worker pool and aggregates
//! outcomes in completion order.
//!
//! All tasks are spawned up front; a semaphore sized to the configured worker
//! count gates how many run at once. Outcomes are drained through a
//! [`tokio::task::JoinSet`] as they complete (not in submission order), and
//! every submitted task is accounted for exactly once: a lost task (worker
//! panic) is folded in as a synthesized failure rather than silently dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::Crawler;
use super::worker::{FetchTaskContext, run_fetch_task};
use crate::error::Result;
use crate::types::{Event, FetchResult, Summary, Task};

impl Crawler {
    /// Crawl every configured seed to completion and return the final tally.
    ///
    /// Individual task failures never abort the run; they only show up in the
    /// summary. There is no retry: a failed task is terminal for the run.
    pub async fn run(&self) -> Result<Summary> {
        self.run_until(CancellationToken::new()).await
    }

    /// [`Crawler::run`], but stop early when `cancel` fires.
    ///
    /// On cancellation, tasks not yet finished are abandoned and the summary
    /// reports the counts gathered so far.
    pub async fn run_until(&self, cancel: CancellationToken) -> Result<Summary> {
        let (summary, _outcomes) = self.run_collecting(cancel).await?;
        Ok(summary)
    }

    /// Run the pool and keep every terminal outcome (one per finished task).
    pub(crate) async fn run_collecting(
        &self,
        cancel: CancellationToken,
    ) -> Result<(Summary, Vec<FetchResult>)> {
        let started = Instant::now();
        let output_dir = self.config.crawl.output_dir.clone();
        tokio::fs::create_dir_all(&output_dir).await?;

        let tasks: Vec<Task> = self
            .config
            .seeds
            .iter()
            .enumerate()
            .map(|(index, url)| Task {
                index,
                url: url.clone(),
            })
            .collect();
        let total = tasks.len();
        self.progress.begin_run(total).await;

        tracing::info!(
            total,
            workers = self.config.crawl.max_workers,
            delay_secs = self.config.crawl.request_delay_secs,
            timeout_secs = self.config.crawl.timeout_secs,
            "starting crawl"
        );

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.crawl.max_workers));
        let mut pool: JoinSet<FetchResult> = JoinSet::new();
        let mut submitted: HashMap<tokio::task::Id, Task> = HashMap::new();

        for task in tasks {
            let ctx = FetchTaskContext {
                task: task.clone(),
                config: Arc::clone(&self.config),
                fetcher: Arc::clone(&self.fetcher),
                cleaner: Arc::clone(&self.cleaner),
                output_dir: output_dir.clone(),
                event_tx: self.event_tx.clone(),
            };
            let semaphore = Arc::clone(&semaphore);
            let handle = pool.spawn(async move {
                let index = ctx.task.index;
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return FetchResult::failure(index, "worker pool closed"),
                };
                run_fetch_task(ctx).await
            });
            submitted.insert(handle.id(), task);
        }

        let mut outcomes = Vec::with_capacity(total);
        let mut interrupted = false;
        loop {
            tokio::select! {
                joined = pool.join_next_with_id() => {
                    match joined {
                        None => break,
                        Some(Ok((id, result))) => {
                            submitted.remove(&id);
                            self.fold_outcome(&result).await;
                            outcomes.push(result);
                        }
                        Some(Err(join_err)) => {
                            let task = submitted.remove(&join_err.id());
                            if join_err.is_cancelled() {
                                if let Some(task) = task {
                                    tracing::debug!(index = task.index, "task abandoned");
                                }
                            } else if let Some(task) = task {
                                // A panicking worker must still yield an outcome
                                let result = FetchResult::failure(
                                    task.index,
                                    format!("worker terminated abnormally: {join_err}"),
                                );
                                self.fold_outcome(&result).await;
                                outcomes.push(result);
                            }
                        }
                    }
                }
                _ = cancel.cancelled(), if !interrupted => {
                    interrupted = true;
                    tracing::warn!("interrupt received, abandoning unfinished tasks");
                    pool.abort_all();
                }
            }
        }

        let snapshot = self.progress.snapshot().await;
        let summary = Summary {
            total: snapshot.total,
            succeeded: snapshot.succeeded,
            elapsed: started.elapsed(),
            output_dir,
        };
        self.emit_event(Event::RunFinished {
            total: summary.total,
            succeeded: summary.succeeded,
            elapsed: summary.elapsed,
        });
        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            interrupted,
            "crawl finished"
        );
        Ok((summary, outcomes))
    }

    async fn fold_outcome(&self, result: &FetchResult) {
        let snapshot = self.progress.record_outcome(result).await;
        self.emit_event(Event::Progress {
            processed: snapshot.processed,
            succeeded: snapshot.succeeded,
            total: snapshot.total,
        });
    }
}
