//! Core types and events for chapter-dl

use std::path::PathBuf;
use std::time::Duration;

/// One unit of crawl work: an address to fetch plus its position in the seed
/// list.
///
/// Tasks are created by the dispatcher at startup (index = position in the
/// seed list), consumed exactly once by exactly one worker, and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Position of the address in the seed list (0-based)
    pub index: usize,
    /// The page address to fetch
    pub url: String,
}

/// Terminal outcome of one task, produced by a worker and folded into the
/// progress counters by the dispatcher exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Index of the originating task
    pub index: usize,
    /// Whether a chapter file was written
    pub success: bool,
    /// Extracted chapter title (empty on failure)
    pub title: String,
    /// Failure diagnostic; `None` on success
    pub diagnostic: Option<String>,
}

impl FetchResult {
    /// Successful outcome carrying the extracted title.
    pub fn success(index: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            success: true,
            title: title.into(),
            diagnostic: None,
        }
    }

    /// Failed outcome carrying a diagnostic.
    pub fn failure(index: usize, diagnostic: impl Into<String>) -> Self {
        Self {
            index,
            success: false,
            title: String::new(),
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// The (title, body) pair produced from one page's markup.
///
/// Transient: produced by the cleaner, consumed immediately by the namer and
/// the file writer. A degraded extraction (missing title, missing content
/// container, implausibly short text) still yields a record — the title falls
/// back to a sentinel and the body to a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    /// Chapter title, or the sentinel when the heading is absent
    pub title: String,
    /// Cleaned body text, or a diagnostic message
    pub body: String,
}

/// Aggregate result of a crawl run.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Number of tasks submitted
    pub total: usize,
    /// Number of tasks that wrote a chapter file
    pub succeeded: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Directory the chapter files were written to
    pub output_dir: PathBuf,
}

impl Summary {
    /// Average wall-clock time per task, or zero for an empty run.
    pub fn average_per_task(&self) -> Duration {
        if self.total == 0 {
            Duration::ZERO
        } else {
            self.elapsed / self.total as u32
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output_dir = self
            .output_dir
            .canonicalize()
            .unwrap_or_else(|_| self.output_dir.clone());
        writeln!(f, "=== crawl complete ===")?;
        writeln!(f, "chapters saved: {}/{}", self.succeeded, self.total)?;
        writeln!(f, "elapsed: {:.2}s", self.elapsed.as_secs_f64())?;
        writeln!(
            f,
            "average per chapter: {:.2}s",
            self.average_per_task().as_secs_f64()
        )?;
        write!(f, "files saved under: {}", output_dir.display())
    }
}

/// Events broadcast by the crawler during a run.
///
/// Subscribe via [`crate::Crawler::subscribe`]; events are dropped when no
/// subscriber is listening, and a subscriber lagging behind the channel buffer
/// receives `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub enum Event {
    /// A worker picked up a task and is about to fetch it
    TaskStarted {
        /// Task index
        index: usize,
        /// Task address
        url: String,
    },
    /// A chapter file was written
    PageSaved {
        /// Task index
        index: usize,
        /// Extracted chapter title
        title: String,
        /// Destination the chapter was written to
        path: PathBuf,
    },
    /// A task reached a terminal failure
    TaskFailed {
        /// Task index
        index: usize,
        /// Task address
        url: String,
        /// What went wrong
        diagnostic: String,
    },
    /// Progress counters after folding one outcome
    Progress {
        /// Tasks that reached a terminal state so far
        processed: usize,
        /// Tasks that wrote a file so far
        succeeded: usize,
        /// Tasks submitted
        total: usize,
    },
    /// All tasks accounted for (or the run was interrupted)
    RunFinished {
        /// Tasks submitted
        total: usize,
        /// Tasks that wrote a file
        succeeded: usize,
        /// Wall-clock duration
        elapsed: Duration,
    },
}
