//! Discovery pipeline: paginate, filter, deduplicate.
//!
//! # Architecture
//!
//! - [`DiscoveryPipeline`] - drives one sequential run against a [`PageSource`]
//! - [`PipelineOptions`] - page ceiling, inter-fetch delay, attempt budget
//! - [`DiscoverySink`] - receives each page's newly discovered identifiers
//! - [`RunReport`] - final identifiers, counts and [`TerminationReason`]
//! - [`PageRetryPolicy`] - decides whether a failed page is fetched again
//! - [`Delay`] - injected wait so tests run without real timers
//!
//! A run walks `idle → fetching → filtering → deduping → (fetching | done | failed)`.
//! Exactly one source call, filter pass or dedup query is in flight at a time.
//! The filter configuration, source and dedup store are shared read-only
//! through `Arc`, so independent runs may execute concurrently.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! use discovery_core::dedup::MemoryDedupStore;
//! use discovery_core::filter::FilterConfig;
//! use discovery_core::pipeline::DiscoveryPipeline;
//! use discovery_core::source::HttpPageSource;
//! use discovery_core::work::WorkKey;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(HttpPageSource::new("https://example.com/ajax/discovery")?);
//! let pipeline = DiscoveryPipeline::new(
//!     source,
//!     Arc::new(FilterConfig::default()),
//!     Arc::new(MemoryDedupStore::new()),
//! );
//!
//! let mut found: Vec<WorkKey> = Vec::new();
//! let report = pipeline.run(&mut found, &AtomicBool::new(false)).await?;
//! println!("{} new works ({})", report.ids.len(), report.reason);
//! # Ok(())
//! # }
//! ```

mod delay;
mod error;
mod report;
mod retry;

pub use delay::{Delay, TokioDelay};
pub use error::PipelineError;
pub use report::{
    DiscoverySink, PageProgress, RunCounts, RunReport, RunState, TerminationReason,
};
pub use retry::{DEFAULT_MAX_PAGE_ATTEMPTS, DEFAULT_PAGE_DELAY, PageRetryPolicy, RetryDecision};

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, instrument, trace, warn};

use crate::dedup::{DedupError, DedupStore};
use crate::filter::{self, FilterConfig};
use crate::source::{PageResult, PageSource, SourceError};
use crate::work::{Candidate, WorkKey};

/// How often a pending delay re-checks the interrupt flag.
const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run-time knobs for [`DiscoveryPipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Stop after this many completed pages. `None` runs until exhaustion.
    pub page_limit: Option<u32>,
    /// Minimum wait before every fetch except the first.
    pub page_delay: Duration,
    /// Attempts per page, including the first.
    pub max_page_attempts: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            page_limit: None,
            page_delay: DEFAULT_PAGE_DELAY,
            max_page_attempts: DEFAULT_MAX_PAGE_ATTEMPTS,
        }
    }
}

/// Mutable state of one run. Never shared between runs.
struct RunProgress {
    state: RunState,
    ids: Vec<WorkKey>,
    seen: HashSet<WorkKey>,
    counts: RunCounts,
    pages_completed: u32,
    fetch_calls: u32,
    source_error: Option<String>,
}

impl RunProgress {
    fn new() -> Self {
        Self {
            state: RunState::Idle,
            ids: Vec::new(),
            seen: HashSet::new(),
            counts: RunCounts::default(),
            pages_completed: 0,
            fetch_calls: 0,
            source_error: None,
        }
    }

    fn enter(&mut self, state: RunState) {
        trace!(from = %self.state, to = %state, "run state transition");
        self.state = state;
    }

    fn finish(mut self, reason: TerminationReason) -> RunReport {
        self.enter(reason.final_state());
        RunReport {
            ids: self.ids,
            counts: self.counts,
            reason,
            pages_completed: self.pages_completed,
            fetch_calls: self.fetch_calls,
            source_error: self.source_error,
        }
    }
}

/// Orchestrates a [`PageSource`], the filter and a [`DedupStore`].
pub struct DiscoveryPipeline {
    source: Arc<dyn PageSource>,
    config: Arc<FilterConfig>,
    dedup: Arc<dyn DedupStore>,
    delay: Arc<dyn Delay>,
    options: PipelineOptions,
    retry: PageRetryPolicy,
}

impl DiscoveryPipeline {
    /// Creates a pipeline with default options and a real timer.
    #[must_use]
    pub fn new(
        source: Arc<dyn PageSource>,
        config: Arc<FilterConfig>,
        dedup: Arc<dyn DedupStore>,
    ) -> Self {
        let options = PipelineOptions::default();
        let retry = PageRetryPolicy::new(options.max_page_attempts, options.page_delay);
        Self {
            source,
            config,
            dedup,
            delay: Arc::new(TokioDelay),
            options,
            retry,
        }
    }

    /// Replaces the run options.
    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.retry = PageRetryPolicy::new(options.max_page_attempts, options.page_delay);
        self.options = options;
        self
    }

    /// Replaces the delay implementation.
    #[must_use]
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the configured options.
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Executes one run.
    ///
    /// Each page's newly discovered identifiers are passed to `sink` as soon
    /// as they are known. `interrupted` is checked at every state boundary and
    /// cuts an inter-fetch delay short; once set, the run stops with
    /// [`TerminationReason::Cancelled`] and the identifiers found so far are
    /// still reported.
    ///
    /// A failing source or dedup store ends the run with
    /// [`TerminationReason::SourceError`] and the failure text in
    /// [`RunReport::source_error`].
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] if the filter configuration is
    /// inconsistent. Nothing is fetched.
    #[instrument(skip_all, fields(source = self.source.name()))]
    pub async fn run(
        &self,
        sink: &mut dyn DiscoverySink,
        interrupted: &AtomicBool,
    ) -> Result<RunReport, PipelineError> {
        self.config.validate()?;

        let mut run = RunProgress::new();
        let reason = self.drive(&mut run, sink, interrupted).await;
        let report = run.finish(reason);

        if report.is_success() {
            info!(
                reason = %report.reason,
                pages = report.pages_completed,
                fetch_calls = report.fetch_calls,
                raw = report.counts.raw_seen,
                filtered_out = report.counts.filtered_out,
                deduped_out = report.counts.deduped_out,
                accepted = report.ids.len(),
                "discovery run finished"
            );
        } else {
            warn!(
                reason = %report.reason,
                pages = report.pages_completed,
                fetch_calls = report.fetch_calls,
                accepted = report.ids.len(),
                error = report.source_error.as_deref().unwrap_or(""),
                "discovery run stopped"
            );
        }
        Ok(report)
    }

    async fn drive(
        &self,
        run: &mut RunProgress,
        sink: &mut dyn DiscoverySink,
        interrupted: &AtomicBool,
    ) -> TerminationReason {
        let cancelled = || interrupted.load(Ordering::SeqCst);
        let mut cursor = self.source.initial_cursor();
        let mut attempt: u32 = 1;
        let mut pending_delay: Option<Duration> = None;

        loop {
            if cancelled() {
                return TerminationReason::Cancelled;
            }
            if let Some(delay) = pending_delay.take() {
                // Race the delay against the interrupt flag.
                tokio::select! {
                    biased;
                    () = async {
                        while !cancelled() {
                            tokio::time::sleep(INTERRUPT_POLL_INTERVAL).await;
                        }
                    } => {}
                    () = self.delay.wait(delay) => {}
                }
                if cancelled() {
                    return TerminationReason::Cancelled;
                }
            }

            run.enter(RunState::Fetching);
            run.fetch_calls += 1;
            let page = match self.source.fetch_page(cursor).await {
                Ok(page) => page,
                Err(error) => match self.retry.should_retry(error.failure_type(), attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next,
                    } => {
                        warn!(cursor, attempt, error = %error, "page fetch failed, retrying");
                        attempt = next;
                        pending_delay = Some(delay);
                        continue;
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        warn!(cursor, attempt, error = %error, reason = %reason, "page fetch failed");
                        run.source_error = Some(error.to_string());
                        return TerminationReason::SourceError;
                    }
                },
            };
            attempt = 1;

            let (records, next_cursor) = match page {
                PageResult::Records {
                    records,
                    next_cursor,
                } if !records.is_empty() => (records, next_cursor),
                PageResult::Records { .. } | PageResult::Exhausted => {
                    return if run.pages_completed == 0 {
                        TerminationReason::EmptyFirstPage
                    } else {
                        TerminationReason::Exhausted
                    };
                }
            };
            if next_cursor <= cursor {
                let error = SourceError::malformed(
                    cursor,
                    format!("next cursor {next_cursor} does not advance past {cursor}"),
                );
                warn!(cursor, next_cursor, "page source cursor did not advance");
                run.source_error = Some(error.to_string());
                return TerminationReason::SourceError;
            }

            if cancelled() {
                return TerminationReason::Cancelled;
            }
            run.enter(RunState::Filtering);
            let accepted = self.filter_page(&records);

            if cancelled() {
                return TerminationReason::Cancelled;
            }
            run.enter(RunState::Deduping);
            let fresh = match self.dedup_page(run, &accepted).await {
                Ok(fresh) => fresh,
                Err(error) => {
                    warn!(cursor, error = %error, "dedup store failed");
                    run.source_error = Some(format!("dedup store failed: {error}"));
                    return TerminationReason::SourceError;
                }
            };

            let progress = PageProgress {
                page: run.pages_completed + 1,
                cursor,
                raw: records.len(),
                filtered_out: records.len() - accepted.len(),
                deduped_out: accepted.len() - fresh.len(),
                accepted: fresh.len(),
            };
            run.counts.raw_seen += progress.raw;
            run.counts.filtered_out += progress.filtered_out;
            run.counts.deduped_out += progress.deduped_out;
            run.pages_completed += 1;
            run.seen.extend(fresh.iter().cloned());
            run.ids.extend(fresh.iter().cloned());

            sink.accept_batch(&fresh);
            sink.page_progress(&progress);
            info!(
                page = progress.page,
                cursor,
                raw = progress.raw,
                filtered_out = progress.filtered_out,
                deduped_out = progress.deduped_out,
                accepted = progress.accepted,
                "page complete"
            );

            if let Some(limit) = self.options.page_limit
                && run.pages_completed >= limit.max(1)
            {
                return TerminationReason::PageLimitReached;
            }

            cursor = next_cursor;
            pending_delay = Some(self.options.page_delay);
        }
    }

    fn filter_page(&self, records: &[Candidate]) -> Vec<WorkKey> {
        let accepted: Vec<WorkKey> = records
            .iter()
            .filter(|candidate| filter::accept(candidate, &self.config))
            .map(Candidate::key)
            .collect();
        debug!(
            raw = records.len(),
            accepted = accepted.len(),
            "page filtered"
        );
        accepted
    }

    /// Drops keys already discovered in this run or repeated on the page,
    /// then asks the store about the rest.
    async fn dedup_page(
        &self,
        run: &RunProgress,
        accepted: &[WorkKey],
    ) -> Result<Vec<WorkKey>, DedupError> {
        let mut on_page = HashSet::new();
        let unseen: Vec<WorkKey> = accepted
            .iter()
            .filter(|key| !run.seen.contains(*key) && on_page.insert(*key))
            .cloned()
            .collect();
        if unseen.is_empty() {
            return Ok(Vec::new());
        }

        self.dedup.filter_new(&unseen).await
    }
}

impl std::fmt::Debug for DiscoveryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryPipeline")
            .field("source", &self.source.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::dedup::{DedupError, MemoryDedupStore};
    use crate::filter::KindToggles;
    use crate::work::WorkKind;

    /// Source that replays a fixed script and records requested cursors.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<PageResult, SourceError>>>,
        cursors: Mutex<Vec<u64>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<PageResult, SourceError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn cursors(&self) -> Vec<u64> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn fetch_page(&self, cursor: u64) -> Result<PageResult, SourceError> {
            self.cursors.lock().unwrap().push(cursor);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(PageResult::Exhausted))
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Delay for RecordingDelay {
        async fn wait(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    struct FailingStore;

    #[async_trait]
    impl DedupStore for FailingStore {
        async fn filter_new(&self, _keys: &[WorkKey]) -> Result<Vec<WorkKey>, DedupError> {
            Err(DedupError::CorruptRow("bad kind".to_string()))
        }
    }

    fn page(ids: &[&str], next_cursor: u64) -> Result<PageResult, SourceError> {
        Ok(PageResult::Records {
            records: ids
                .iter()
                .map(|id| Candidate::new(WorkKind::Image, *id))
                .collect(),
            next_cursor,
        })
    }

    fn pipeline(
        source: Arc<ScriptedSource>,
        dedup: Arc<dyn DedupStore>,
        delay: Arc<RecordingDelay>,
    ) -> DiscoveryPipeline {
        DiscoveryPipeline::new(source, Arc::new(FilterConfig::default()), dedup)
            .with_delay(delay)
            .with_options(PipelineOptions {
                page_delay: Duration::from_millis(10),
                ..PipelineOptions::default()
            })
    }

    fn ids(report: &RunReport) -> Vec<&str> {
        report.ids.iter().map(|key| key.id.as_str()).collect()
    }

    // ==================== Ordering Tests ====================

    #[tokio::test]
    async fn test_cursor_advances_from_page() {
        let source = Arc::new(ScriptedSource::new(vec![
            page(&["1", "2"], 2),
            page(&["3"], 3),
            Ok(PageResult::Exhausted),
        ]));
        let delay = Arc::new(RecordingDelay::default());
        let pipeline = pipeline(
            Arc::clone(&source),
            Arc::new(MemoryDedupStore::new()),
            Arc::clone(&delay),
        );

        let mut sink = Vec::new();
        let report = pipeline
            .run(&mut sink, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(source.cursors(), vec![0, 2, 3]);
        assert_eq!(ids(&report), vec!["1", "2", "3"]);
        assert_eq!(sink, report.ids);
        assert_eq!(report.reason, TerminationReason::Exhausted);
        assert_eq!(report.pages_completed, 2);
    }

    #[tokio::test]
    async fn test_delay_before_every_fetch_but_first() {
        let source = Arc::new(ScriptedSource::new(vec![
            page(&["1"], 1),
            Err(SourceError::unavailable(1, "busy")),
            page(&["2"], 2),
            Ok(PageResult::Exhausted),
        ]));
        let delay = Arc::new(RecordingDelay::default());
        let pipeline = pipeline(
            Arc::clone(&source),
            Arc::new(MemoryDedupStore::new()),
            Arc::clone(&delay),
        );

        let report = pipeline
            .run(&mut Vec::new(), &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(report.fetch_calls, 4);
        let waits = delay.waits.lock().unwrap().clone();
        assert_eq!(waits, vec![Duration::from_millis(10); 3]);
        // The failed cursor is fetched again, not skipped.
        assert_eq!(source.cursors(), vec![0, 1, 1, 2]);
    }

    #[tokio::test]
    async fn test_attempt_budget_resets_after_success() {
        let source = Arc::new(ScriptedSource::new(vec![
            Err(SourceError::unavailable(0, "busy")),
            Err(SourceError::unavailable(0, "busy")),
            page(&["1"], 1),
            Err(SourceError::unavailable(1, "busy")),
            Err(SourceError::unavailable(1, "busy")),
            page(&["2"], 2),
            Ok(PageResult::Exhausted),
        ]));
        let pipeline = pipeline(
            source,
            Arc::new(MemoryDedupStore::new()),
            Arc::new(RecordingDelay::default()),
        );

        let report = pipeline
            .run(&mut Vec::new(), &AtomicBool::new(false))
            .await
            .unwrap();
        assert_eq!(report.reason, TerminationReason::Exhausted);
        assert_eq!(ids(&report), vec!["1", "2"]);
        assert_eq!(report.fetch_calls, 7);
    }

    #[tokio::test]
    async fn test_non_advancing_cursor_is_source_error() {
        let source = Arc::new(ScriptedSource::new(vec![
            page(&["1"], 5),
            page(&["2"], 5),
        ]));
        let pipeline = pipeline(
            source,
            Arc::new(MemoryDedupStore::new()),
            Arc::new(RecordingDelay::default()),
        );

        let report = pipeline
            .run(&mut Vec::new(), &AtomicBool::new(false))
            .await
            .unwrap();
        assert_eq!(report.reason, TerminationReason::SourceError);
        assert_eq!(ids(&report), vec!["1"]);
        assert!(report.source_error.unwrap().contains("does not advance"));
    }

    // ==================== Dedup Tests ====================

    #[tokio::test]
    async fn test_duplicates_within_run_are_dropped() {
        let source = Arc::new(ScriptedSource::new(vec![
            page(&["1", "2", "2"], 3),
            page(&["2", "3"], 5),
            Ok(PageResult::Exhausted),
        ]));
        let pipeline = pipeline(
            source,
            Arc::new(MemoryDedupStore::new()),
            Arc::new(RecordingDelay::default()),
        );

        let report = pipeline
            .run(&mut Vec::new(), &AtomicBool::new(false))
            .await
            .unwrap();
        assert_eq!(ids(&report), vec!["1", "2", "3"]);
        assert_eq!(report.counts.raw_seen, 5);
        assert_eq!(report.counts.deduped_out, 2);
        assert_eq!(report.counts.accepted(), 3);
    }

    #[tokio::test]
    async fn test_dedup_failure_ends_run_with_source_error() {
        struct FailSecond {
            calls: Mutex<u32>,
        }

        #[async_trait]
        impl DedupStore for FailSecond {
            async fn filter_new(&self, keys: &[WorkKey]) -> Result<Vec<WorkKey>, DedupError> {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                if *calls == 1 {
                    Ok(keys.to_vec())
                } else {
                    Err(DedupError::CorruptRow("bad kind".to_string()))
                }
            }
        }

        let source = Arc::new(ScriptedSource::new(vec![page(&["1"], 1), page(&["2"], 2)]));
        let pipeline = pipeline(
            source,
            Arc::new(FailSecond {
                calls: Mutex::new(0),
            }),
            Arc::new(RecordingDelay::default()),
        );

        let mut sink = Vec::new();
        let report = pipeline
            .run(&mut sink, &AtomicBool::new(false))
            .await
            .unwrap();
        assert_eq!(report.reason, TerminationReason::SourceError);
        assert_eq!(report.final_state(), RunState::Failed);
        assert_eq!(ids(&report), vec!["1"]);
        assert_eq!(sink, report.ids);
        assert_eq!(report.pages_completed, 1);
        let message = report.source_error.unwrap();
        assert!(message.contains("dedup store failed"), "got: {message}");
        assert!(message.contains("bad kind"), "got: {message}");
    }

    #[tokio::test]
    async fn test_store_not_queried_when_nothing_accepted() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(PageResult::Records {
                records: vec![Candidate::new(WorkKind::Image, "").advertisement()],
                next_cursor: 1,
            }),
            Ok(PageResult::Exhausted),
        ]));
        // A failing store proves filter_new is never reached.
        let pipeline = pipeline(
            source,
            Arc::new(FailingStore),
            Arc::new(RecordingDelay::default()),
        );

        let report = pipeline
            .run(&mut Vec::new(), &AtomicBool::new(false))
            .await
            .unwrap();
        assert_eq!(report.reason, TerminationReason::Exhausted);
        assert_eq!(report.counts.filtered_out, 1);
    }

    // ==================== Configuration and Cancellation Tests ====================

    #[tokio::test]
    async fn test_invalid_config_fails_before_fetch() {
        let source = Arc::new(ScriptedSource::new(vec![page(&["1"], 1)]));
        let config = FilterConfig {
            kinds: KindToggles {
                image: false,
                multi_image: false,
                animated: false,
                text: false,
                unknown: false,
            },
            ..FilterConfig::default()
        };
        let pipeline = DiscoveryPipeline::new(
            Arc::clone(&source) as Arc<dyn PageSource>,
            Arc::new(config),
            Arc::new(MemoryDedupStore::new()),
        );

        let error = pipeline
            .run(&mut Vec::new(), &AtomicBool::new(false))
            .await
            .unwrap_err();
        assert!(matches!(error, PipelineError::Configuration(_)));
        assert!(source.cursors().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_before_start_fetches_nothing() {
        let source = Arc::new(ScriptedSource::new(vec![page(&["1"], 1)]));
        let pipeline = pipeline(
            Arc::clone(&source),
            Arc::new(MemoryDedupStore::new()),
            Arc::new(RecordingDelay::default()),
        );

        let report = pipeline
            .run(&mut Vec::new(), &AtomicBool::new(true))
            .await
            .unwrap();
        assert_eq!(report.reason, TerminationReason::Cancelled);
        assert_eq!(report.final_state(), RunState::Failed);
        assert_eq!(report.fetch_calls, 0);
        assert!(source.cursors().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_delay() {
        /// Never finishes on its own.
        struct StalledDelay;

        #[async_trait]
        impl Delay for StalledDelay {
            async fn wait(&self, _duration: Duration) {
                std::future::pending::<()>().await;
            }
        }

        let source = Arc::new(ScriptedSource::new(vec![page(&["1"], 1), page(&["2"], 2)]));
        let pipeline = DiscoveryPipeline::new(
            Arc::clone(&source) as Arc<dyn PageSource>,
            Arc::new(FilterConfig::default()),
            Arc::new(MemoryDedupStore::new()),
        )
        .with_delay(Arc::new(StalledDelay));

        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupted);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let mut sink = Vec::new();
        let report = tokio::time::timeout(
            Duration::from_secs(5),
            pipeline.run(&mut sink, &interrupted),
        )
        .await
        .expect("delay was not interrupted")
        .unwrap();

        assert_eq!(report.reason, TerminationReason::Cancelled);
        assert_eq!(ids(&report), vec!["1"]);
        assert_eq!(source.cursors(), vec![0]);
    }

    #[tokio::test]
    async fn test_page_limit_zero_is_treated_as_one() {
        let source = Arc::new(ScriptedSource::new(vec![page(&["1"], 1), page(&["2"], 2)]));
        let pipeline = pipeline(
            Arc::clone(&source),
            Arc::new(MemoryDedupStore::new()),
            Arc::new(RecordingDelay::default()),
        )
        .with_options(PipelineOptions {
            page_limit: Some(0),
            page_delay: Duration::ZERO,
            max_page_attempts: 3,
        });

        let report = pipeline
            .run(&mut Vec::new(), &AtomicBool::new(false))
            .await
            .unwrap();
        assert_eq!(report.reason, TerminationReason::PageLimitReached);
        assert_eq!(source.cursors(), vec![0]);
    }
}
