//! Run state, progress and the final report.

use std::fmt;

use crate::work::WorkKey;

/// State of a discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started.
    Idle,
    /// Waiting on the page source.
    Fetching,
    /// Evaluating a page against the filter.
    Filtering,
    /// Querying the dedup store.
    Deduping,
    /// Finished normally.
    Done,
    /// Stopped by an error or cancellation.
    Failed,
}

impl RunState {
    /// Returns the log representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Filtering => "filtering",
            Self::Deduping => "deduping",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a run stopped. Every run ends with exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// Source returned an empty page after at least one non-empty page.
    Exhausted,
    /// Configured page ceiling was reached.
    PageLimitReached,
    /// Source failed permanently or ran out of attempts.
    SourceError,
    /// The very first page was empty.
    EmptyFirstPage,
    /// Caller requested cancellation.
    Cancelled,
}

impl TerminationReason {
    /// Returns the stable text representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::PageLimitReached => "page-limit-reached",
            Self::SourceError => "source-error",
            Self::EmptyFirstPage => "empty-first-page",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal state this reason leaves the run in.
    #[must_use]
    pub fn final_state(&self) -> RunState {
        match self {
            Self::Exhausted | Self::PageLimitReached | Self::EmptyFirstPage => RunState::Done,
            Self::SourceError | Self::Cancelled => RunState::Failed,
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Candidate totals for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    /// Candidates returned by the source.
    pub raw_seen: usize,
    /// Candidates rejected by the filter.
    pub filtered_out: usize,
    /// Accepted candidates dropped as already known.
    pub deduped_out: usize,
}

impl RunCounts {
    /// Candidates that made it into the final list.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.raw_seen - self.filtered_out - self.deduped_out
    }
}

/// Counts for one completed page, passed to [`DiscoverySink::page_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// Page number, starting at 1.
    pub page: u32,
    /// Cursor the page was fetched with.
    pub cursor: u64,
    /// Candidates on the page.
    pub raw: usize,
    /// Rejected by the filter.
    pub filtered_out: usize,
    /// Dropped as already known.
    pub deduped_out: usize,
    /// Newly discovered.
    pub accepted: usize,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Discovered identifiers in discovery order, without duplicates.
    pub ids: Vec<WorkKey>,
    /// Candidate totals.
    pub counts: RunCounts,
    /// Why the run stopped.
    pub reason: TerminationReason,
    /// Pages fetched, filtered and deduped.
    pub pages_completed: u32,
    /// Calls made to the page source, retries included.
    pub fetch_calls: u32,
    /// Message of the source error that ended the run, if any.
    pub source_error: Option<String>,
}

impl RunReport {
    /// Terminal state of the run.
    #[must_use]
    pub fn final_state(&self) -> RunState {
        self.reason.final_state()
    }

    /// Returns true when the run ended in `Done`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.final_state() == RunState::Done
    }
}

/// Receives discovered identifiers as the run progresses.
pub trait DiscoverySink: Send {
    /// Called once per completed page with the newly discovered identifiers,
    /// possibly empty.
    fn accept_batch(&mut self, batch: &[WorkKey]);

    /// Called once per completed page, after [`DiscoverySink::accept_batch`].
    fn page_progress(&mut self, _progress: &PageProgress) {}
}

impl DiscoverySink for Vec<WorkKey> {
    fn accept_batch(&mut self, batch: &[WorkKey]) {
        self.extend_from_slice(batch);
    }
}
