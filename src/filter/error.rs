//! Error types for filter configuration.

use thiserror::Error;

/// Internal consistency failures in a [`super::FilterConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Every work kind is switched off, so nothing could ever pass.
    #[error("no work kinds are enabled")]
    NoKindsEnabled,

    /// Every restriction level is switched off, so nothing could ever pass.
    #[error("no restriction levels are enabled")]
    NoRestrictionLevelsEnabled,

    /// Both single-page and multi-page works are switched off.
    #[error("neither single-page nor multi-page works are enabled")]
    NoPageCountsEnabled,

    /// Custom aspect ratio is not a positive finite number.
    #[error("invalid custom aspect ratio {ratio}: must be a positive finite number")]
    InvalidRatio {
        /// The rejected ratio.
        ratio: f64,
    },

    /// Bookmark minimum exceeds maximum.
    #[error("bookmark range is inverted: min {min} > max {max}")]
    InvertedBookmarkRange {
        /// Configured minimum.
        min: u64,
        /// Configured maximum.
        max: u64,
    },

    /// Tag filter is enabled but names no tags.
    #[error("tag filter is enabled but has no required or forbidden tags")]
    EmptyTagFilter,

    /// A configured tag is blank, padded, or not lowercase.
    #[error("tag {tag:?} is not normalized (expected trimmed, lowercase, non-empty)")]
    UnnormalizedTag {
        /// The offending tag.
        tag: String,
    },

    /// An owner block entry has a blank owner id.
    #[error("owner block entry has an empty owner id")]
    EmptyOwnerId,
}
