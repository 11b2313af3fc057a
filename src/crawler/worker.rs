//! Fetch worker — the full lifecycle of a single task.
//!
//! Phases: optional fixed delay, network fetch, markup cleaning, destination
//! naming, file write. Every failure along the way is converted into a failed
//! [`FetchResult`]; nothing a worker does can take down the pool.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cleaner::Cleaner;
use crate::config::Config;
use crate::fetch::PageFetcher;
use crate::types::{Event, FetchResult, Task};

/// Everything one worker needs to run one task.
pub(crate) struct FetchTaskContext {
    pub(crate) task: Task,
    pub(crate) config: Arc<Config>,
    pub(crate) fetcher: Arc<dyn PageFetcher>,
    pub(crate) cleaner: Arc<Cleaner>,
    pub(crate) output_dir: PathBuf,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl FetchTaskContext {
    fn emit(&self, event: Event) {
        // send() errs only when nobody subscribes, which is fine
        self.event_tx.send(event).ok();
    }

    fn fail(&self, diagnostic: String) -> FetchResult {
        self.emit(Event::TaskFailed {
            index: self.task.index,
            url: self.task.url.clone(),
            diagnostic: diagnostic.clone(),
        });
        FetchResult::failure(self.task.index, diagnostic)
    }
}

/// Run one task to its terminal state. Writes exactly one file on the success
/// path and nothing on failure.
pub(crate) async fn run_fetch_task(ctx: FetchTaskContext) -> FetchResult {
    let index = ctx.task.index;
    let url = ctx.task.url.clone();

    ctx.emit(Event::TaskStarted {
        index,
        url: url.clone(),
    });
    tracing::debug!(index, url = %url, "fetching page");

    // Phase 1: fixed pre-fetch delay (politeness pacing)
    let delay = ctx.config.crawl.request_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    // Phase 2: network fetch
    let markup = match ctx.fetcher.fetch(&url).await {
        Ok(markup) => markup,
        Err(err) => {
            tracing::warn!(index, url = %url, error = %err, "fetch failed");
            return ctx.fail(err.to_string());
        }
    };

    // Phase 3: markup cleaning (infallible; degraded pages still produce a
    // record)
    let record = ctx.cleaner.clean(&markup);

    // Phase 4: destination naming against the real filesystem
    let path = match crate::naming::resolve_in_dir(&ctx.output_dir, &record.title) {
        Ok(path) => path,
        Err(err) => {
            tracing::warn!(index, title = %record.title, error = %err, "naming failed");
            return ctx.fail(err.to_string());
        }
    };

    // Phase 5: persist
    if let Err(err) = tokio::fs::write(&path, record.body.as_bytes()).await {
        tracing::warn!(index, path = %path.display(), error = %err, "write failed");
        return ctx.fail(format!("write failed: {err}"));
    }

    ctx.emit(Event::PageSaved {
        index,
        title: record.title.clone(),
        path,
    });
    FetchResult::success(index, record.title)
}
