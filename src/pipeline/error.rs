//! Errors that abort a discovery run without a report.
//!
//! Source failures, dedup store failures and cancellation are not errors: they
//! end the run with a [`super::TerminationReason`] in the report. Only a bad
//! configuration surfaces here.

use thiserror::Error;

use crate::filter::ConfigError;

/// Errors returned by [`super::DiscoveryPipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Filter configuration failed its consistency check. No fetch was issued.
    #[error("invalid filter configuration: {0}")]
    Configuration(#[from] ConfigError),
}
