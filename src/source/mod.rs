//! Paginated listing sources that feed the discovery pipeline.
//!
//! # Architecture
//!
//! - [`PageSource`] - async trait a site adapter implements
//! - [`PageResult`] - one page of candidates, or exhaustion
//! - [`SourceError`] - adapter errors, already classified as transient or permanent
//! - [`HttpPageSource`] - adapter for JSON listing endpoints
//!
//! Adapters translate one cursor into exactly one outbound request. Calling
//! [`PageSource::fetch_page`] twice with the same cursor must return the same
//! records, so a failed call can be retried without skipping or duplicating work.

mod error;
mod http;

pub use error::{FailureType, SourceError};
pub use http::{DEFAULT_PAGE_SIZE, HttpPageSource, HttpSourceOptions};

use async_trait::async_trait;

use crate::work::Candidate;

/// Result of fetching one page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageResult {
    /// A page of candidates and the cursor of the page after it.
    Records {
        /// Candidates in source order.
        records: Vec<Candidate>,
        /// Cursor to request next; must be greater than the cursor just used.
        next_cursor: u64,
    },
    /// No more records are available.
    Exhausted,
}

impl PageResult {
    /// Number of candidates on this page (zero when exhausted).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Records { records, .. } => records.len(),
            Self::Exhausted => 0,
        }
    }

    /// Returns true when the page carries no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait every listing adapter implements.
///
/// # Object Safety
///
/// Uses `async_trait` so the pipeline can hold an `Arc<dyn PageSource>`.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Adapter name for logging.
    fn name(&self) -> &str;

    /// Cursor of the first page.
    fn initial_cursor(&self) -> u64 {
        0
    }

    /// Fetches the page at `cursor`.
    async fn fetch_page(&self, cursor: u64) -> Result<PageResult, SourceError>;
}
