//! Discovery Core Library
//!
//! Discovers candidate work identifiers from a paginated listing and narrows
//! them to the ones a caller should act on: works that pass the user's filter
//! and were not processed in an earlier session.
//!
//! # Architecture
//!
//! Data flows one way through the pipeline:
//!
//! ```text
//! PageSource -> filter::accept -> DedupStore -> DiscoverySink
//! ```
//!
//! - [`work`] - candidates and their `(kind, id)` keys
//! - [`filter`] - the filter configuration and evaluator
//! - [`source`] - paginated listing sources, including the HTTP adapter
//! - [`dedup`] - processed-work lookups, in memory or in SQLite
//! - [`pipeline`] - the sequential discovery run and its report
//! - [`settings`] - settings files normalized into a filter configuration
//! - [`db`] - database connection and schema management

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![warn(missing_docs)]

pub mod db;
pub mod dedup;
pub mod filter;
pub mod pipeline;
pub mod settings;
pub mod source;
mod user_agent;
pub mod work;

// Re-export commonly used types
pub use db::{Database, DbError};
pub use dedup::{DedupError, DedupStore, MemoryDedupStore, SqliteDedupStore};
pub use filter::{ConfigError, FilterConfig, accept};
pub use pipeline::{
    DEFAULT_MAX_PAGE_ATTEMPTS, DEFAULT_PAGE_DELAY, DiscoveryPipeline, DiscoverySink, PageProgress,
    PipelineError, PipelineOptions, RunCounts, RunReport, RunState, TerminationReason,
};
pub use settings::{Settings, SettingsError};
pub use source::{
    DEFAULT_PAGE_SIZE, FailureType, HttpPageSource, HttpSourceOptions, PageResult, PageSource,
    SourceError,
};
pub use work::{Candidate, RestrictionLevel, WorkKey, WorkKind};
