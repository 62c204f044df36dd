//! Candidate filtering against an immutable [`FilterConfig`] snapshot.
//!
//! # Overview
//!
//! - [`FilterConfig`] - every user-chosen constraint for one run
//! - [`accept`] - the deterministic, short-circuiting predicate
//! - [`ConfigError`] - internal consistency failures caught before a run starts
//!
//! Optional constraints are modelled as `Option`: `None` means the check is
//! disabled and is skipped entirely rather than treated as a pass.
//!
//! # Example
//!
//! ```
//! use discovery_core::filter::{FilterConfig, TagFilter, accept};
//! use discovery_core::work::{Candidate, WorkKind};
//!
//! let config = FilterConfig {
//!     tags: Some(TagFilter::forbid(["nsfw"])),
//!     ..FilterConfig::default()
//! };
//! let candidate = Candidate::new(WorkKind::Image, "1").with_tags(["nsfw"]);
//! assert!(!accept(&candidate, &config));
//! ```

mod error;
mod evaluator;

pub use error::ConfigError;
pub use evaluator::{CUSTOM_RATIO_TOLERANCE, accept};

use crate::work::{RestrictionLevel, WorkKind};

/// Upper bound accepted for bookmark-count limits.
pub const BOOKMARK_COUNT_LIMIT: u64 = 9_999_999;

/// Per-kind enable switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindToggles {
    /// Illustrations.
    pub image: bool,
    /// Manga and other multi-image works.
    pub multi_image: bool,
    /// Animated works.
    pub animated: bool,
    /// Novels.
    pub text: bool,
    /// Works whose type the source did not report.
    pub unknown: bool,
}

impl KindToggles {
    /// Returns whether candidates of `kind` may pass.
    #[must_use]
    pub fn allows(&self, kind: WorkKind) -> bool {
        match kind {
            WorkKind::Image => self.image,
            WorkKind::MultiImage => self.multi_image,
            WorkKind::Animated => self.animated,
            WorkKind::Text => self.text,
            WorkKind::Unknown => self.unknown,
        }
    }

    fn any_enabled(&self) -> bool {
        WorkKind::ALL.iter().any(|kind| self.allows(*kind))
    }
}

impl Default for KindToggles {
    fn default() -> Self {
        Self {
            image: true,
            multi_image: true,
            animated: true,
            text: true,
            unknown: true,
        }
    }
}

/// Per-restriction-level enable switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestrictionToggles {
    /// Unrestricted works.
    pub all_ages: bool,
    /// R-18 works.
    pub r18: bool,
    /// R-18G works.
    pub r18g: bool,
}

impl RestrictionToggles {
    /// Returns whether candidates at `level` may pass.
    #[must_use]
    pub fn allows(&self, level: RestrictionLevel) -> bool {
        match level {
            RestrictionLevel::AllAges => self.all_ages,
            RestrictionLevel::R18 => self.r18,
            RestrictionLevel::R18G => self.r18g,
        }
    }
}

impl Default for RestrictionToggles {
    fn default() -> Self {
        Self {
            all_ages: true,
            r18: true,
            r18g: true,
        }
    }
}

/// Single-page and multi-page switches for image-like works.
///
/// Text works are never split by page count and always pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCountToggles {
    /// Works with exactly one page.
    pub single_page: bool,
    /// Works with more than one page.
    pub multi_page: bool,
}

impl PageCountToggles {
    /// Returns whether a work of `kind` with `page_count` pages may pass.
    #[must_use]
    pub fn allows(&self, kind: WorkKind, page_count: u32) -> bool {
        match (kind, page_count) {
            (WorkKind::Text, _) => true,
            (_, 0 | 1) => self.single_page,
            _ => self.multi_page,
        }
    }
}

impl Default for PageCountToggles {
    fn default() -> Self {
        Self {
            single_page: true,
            multi_page: true,
        }
    }
}

/// Comparison applied to each dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `>=`
    AtLeast,
    /// `=`
    Exactly,
    /// `<=`
    AtMost,
}

impl Comparison {
    /// Returns whether `actual` satisfies the comparison against `bound`.
    #[must_use]
    pub fn holds(self, actual: u32, bound: u32) -> bool {
        match self {
            Self::AtLeast => actual >= bound,
            Self::Exactly => actual == bound,
            Self::AtMost => actual <= bound,
        }
    }
}

/// How the width and height checks combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Width and height must both pass.
    And,
    /// Either width or height passing is enough.
    Or,
}

/// Width/height bounds for single-page works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionFilter {
    /// Operator applied to both dimensions.
    pub comparison: Comparison,
    /// How the two results combine.
    pub combinator: Combinator,
    /// Width bound in pixels.
    pub width: u32,
    /// Height bound in pixels.
    pub height: u32,
}

/// Target shape for the aspect-ratio check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AspectTarget {
    /// Width equals height.
    Square,
    /// Wider than tall.
    Horizontal,
    /// Taller than wide.
    Vertical,
    /// Width divided by height, compared within [`CUSTOM_RATIO_TOLERANCE`].
    Custom(f64),
}

/// What to do with candidates whose bookmark count the source did not report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingBookmarks {
    /// Missing counts fail the range check.
    #[default]
    Reject,
    /// Missing counts skip the range check.
    Accept,
}

/// Inclusive bookmark-count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookmarkRange {
    /// Lowest accepted count.
    pub min: u64,
    /// Highest accepted count.
    pub max: u64,
    /// Policy for candidates without a count.
    pub missing: MissingBookmarks,
}

impl BookmarkRange {
    /// Range `min..=max` that rejects missing counts.
    #[must_use]
    pub fn new(min: u64, max: u64) -> Self {
        Self {
            min,
            max,
            missing: MissingBookmarks::default(),
        }
    }
}

/// How many required tags must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequiredTagMode {
    /// Every required tag must be present.
    #[default]
    All,
    /// One required tag is enough.
    Any,
}

/// How a configured tag is compared with a candidate tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMatch {
    /// Case-insensitive equality.
    #[default]
    Whole,
    /// Case-insensitive substring.
    Partial,
}

impl TagMatch {
    /// Returns whether `candidate_tag` matches the configured `target`.
    ///
    /// `target` is expected to be lowercase already (see [`FilterConfig::validate`]).
    #[must_use]
    pub fn matches(self, candidate_tag: &str, target: &str) -> bool {
        let candidate_tag = candidate_tag.to_lowercase();
        match self {
            Self::Whole => candidate_tag == target,
            Self::Partial => candidate_tag.contains(target),
        }
    }
}

/// Required and forbidden tag sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagFilter {
    /// Tags a candidate must carry, per `required_mode`.
    pub required: Vec<String>,
    /// All-of or any-of for `required`.
    pub required_mode: RequiredTagMode,
    /// Tags a candidate must not carry.
    pub forbidden: Vec<String>,
    /// Comparison used for both sets.
    pub matching: TagMatch,
}

impl TagFilter {
    /// Filter that only forbids the given tags.
    #[must_use]
    pub fn forbid<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            forbidden: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Filter that only requires the given tags under `mode`.
    #[must_use]
    pub fn require<I, S>(tags: I, mode: RequiredTagMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: tags.into_iter().map(Into::into).collect(),
            required_mode: mode,
            ..Self::default()
        }
    }
}

/// Tags blocked only for works of one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerTagBlock {
    /// Owner the block applies to.
    pub owner_id: String,
    /// Tags rejected for that owner.
    pub tags: Vec<String>,
}

/// Which side of the bound numeric ids must fall on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRange {
    /// Ids strictly greater than the bound.
    Above(u64),
    /// Ids strictly less than the bound.
    Below(u64),
}

/// Immutable snapshot of every filter constraint for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// Reject advertisement slots.
    pub exclude_advertisements: bool,
    /// Work kinds that may pass.
    pub kinds: KindToggles,
    /// Restriction levels that may pass.
    pub restrictions: RestrictionToggles,
    /// Single-page and multi-page switches.
    pub page_counts: PageCountToggles,
    /// Width/height bounds for single-page works.
    pub dimensions: Option<DimensionFilter>,
    /// Shape or custom ratio the dimensions must match.
    pub aspect_ratio: Option<AspectTarget>,
    /// Accepted bookmark-count range.
    pub bookmarks: Option<BookmarkRange>,
    /// Required and forbidden tags.
    pub tags: Option<TagFilter>,
    /// Owners whose works are always rejected.
    pub blocked_owners: Option<Vec<String>>,
    /// Tags rejected only for specific owners.
    pub owner_tag_blocks: Option<Vec<OwnerTagBlock>>,
    /// Bound numeric ids must lie beyond.
    pub id_range: Option<IdRange>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_advertisements: true,
            kinds: KindToggles::default(),
            restrictions: RestrictionToggles::default(),
            page_counts: PageCountToggles::default(),
            dimensions: None,
            aspect_ratio: None,
            bookmarks: None,
            tags: None,
            blocked_owners: None,
            owner_tag_blocks: None,
            id_range: None,
        }
    }
}

impl FilterConfig {
    /// Checks internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first inconsistency found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.kinds.any_enabled() {
            return Err(ConfigError::NoKindsEnabled);
        }

        let levels = self.restrictions;
        if !(levels.all_ages || levels.r18 || levels.r18g) {
            return Err(ConfigError::NoRestrictionLevelsEnabled);
        }

        if !(self.page_counts.single_page || self.page_counts.multi_page) {
            return Err(ConfigError::NoPageCountsEnabled);
        }

        if let Some(AspectTarget::Custom(ratio)) = self.aspect_ratio
            && !(ratio.is_finite() && ratio > 0.0)
        {
            return Err(ConfigError::InvalidRatio { ratio });
        }

        if let Some(range) = self.bookmarks
            && range.min > range.max
        {
            return Err(ConfigError::InvertedBookmarkRange {
                min: range.min,
                max: range.max,
            });
        }

        if let Some(tags) = &self.tags {
            if tags.required.is_empty() && tags.forbidden.is_empty() {
                return Err(ConfigError::EmptyTagFilter);
            }
            for tag in tags.required.iter().chain(&tags.forbidden) {
                check_tag(tag)?;
            }
        }

        if let Some(owners) = &self.blocked_owners
            && owners.iter().any(|owner| owner.trim().is_empty())
        {
            return Err(ConfigError::EmptyOwnerId);
        }

        for block in self.owner_tag_blocks.iter().flatten() {
            if block.owner_id.trim().is_empty() {
                return Err(ConfigError::EmptyOwnerId);
            }
            for tag in &block.tags {
                check_tag(tag)?;
            }
        }

        Ok(())
    }
}

/// Configured tags must be non-empty, trimmed and lowercase.
fn check_tag(tag: &str) -> Result<(), ConfigError> {
    if tag.trim().is_empty() || tag.trim() != tag || tag.to_lowercase() != tag {
        return Err(ConfigError::UnnormalizedTag {
            tag: tag.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FilterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_all_kinds_disabled() {
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
        assert!(matches!(config.validate(), Err(ConfigError::NoKindsEnabled)));
    }

    #[test]
    fn test_validate_rejects_all_levels_disabled() {
        let config = FilterConfig {
            restrictions: RestrictionToggles {
                all_ages: false,
                r18: false,
                r18g: false,
            },
            ..FilterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoRestrictionLevelsEnabled)
        ));
    }

    #[test]
    fn test_validate_rejects_both_page_counts_disabled() {
        let config = FilterConfig {
            page_counts: PageCountToggles {
                single_page: false,
                multi_page: false,
            },
            ..FilterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoPageCountsEnabled)
        ));
    }

    #[test]
    fn test_page_count_toggles_ignore_text_works() {
        let toggles = PageCountToggles {
            single_page: false,
            multi_page: true,
        };
        assert!(!toggles.allows(WorkKind::Image, 1));
        assert!(!toggles.allows(WorkKind::Animated, 0));
        assert!(toggles.allows(WorkKind::MultiImage, 12));
        assert!(toggles.allows(WorkKind::Text, 1));
    }

    #[test]
    fn test_validate_rejects_non_positive_ratio() {
        for ratio in [0.0, -1.4, f64::NAN, f64::INFINITY] {
            let config = FilterConfig {
                aspect_ratio: Some(AspectTarget::Custom(ratio)),
                ..FilterConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidRatio { .. })),
                "ratio {ratio} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_inverted_bookmark_range() {
        let config = FilterConfig {
            bookmarks: Some(BookmarkRange::new(500, 10)),
            ..FilterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedBookmarkRange { min: 500, max: 10 })
        ));
    }

    #[test]
    fn test_validate_rejects_enabled_but_empty_tag_filter() {
        let config = FilterConfig {
            tags: Some(TagFilter::default()),
            ..FilterConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyTagFilter)));
    }

    #[test]
    fn test_validate_rejects_unnormalized_tags() {
        for tag in ["", "  ", " cat", "Cat"] {
            let config = FilterConfig {
                tags: Some(TagFilter::forbid([tag])),
                ..FilterConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::UnnormalizedTag { .. })),
                "tag {tag:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_blank_owner_ids() {
        let config = FilterConfig {
            owner_tag_blocks: Some(vec![OwnerTagBlock {
                owner_id: " ".to_string(),
                tags: vec!["cat".to_string()],
            }]),
            ..FilterConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyOwnerId)));
    }

    #[test]
    fn test_tag_match_modes() {
        assert!(TagMatch::Whole.matches("Landscape", "landscape"));
        assert!(!TagMatch::Whole.matches("landscape art", "landscape"));
        assert!(TagMatch::Partial.matches("Landscape Art", "landscape"));
        assert!(!TagMatch::Partial.matches("portrait", "landscape"));
    }

    #[test]
    fn test_comparison_holds() {
        assert!(Comparison::AtLeast.holds(1920, 1920));
        assert!(!Comparison::AtLeast.holds(1919, 1920));
        assert!(Comparison::Exactly.holds(1080, 1080));
        assert!(!Comparison::Exactly.holds(1081, 1080));
        assert!(Comparison::AtMost.holds(800, 1080));
        assert!(!Comparison::AtMost.holds(1081, 1080));
    }
}
