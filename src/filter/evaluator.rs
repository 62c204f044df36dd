//! The candidate acceptance predicate.
//!
//! Checks run in a fixed order and stop at the first failure. Later checks rely
//! on earlier ones having narrowed the domain (for example the dimension check
//! only ever sees single-page works that passed the page-count switches).

use tracing::trace;

use super::{
    AspectTarget, BookmarkRange, Combinator, DimensionFilter, FilterConfig, IdRange,
    MissingBookmarks, OwnerTagBlock, RequiredTagMode, TagFilter,
};
use crate::work::{Candidate, WorkKind};

/// Absolute tolerance when comparing a candidate ratio with a custom target.
pub const CUSTOM_RATIO_TOLERANCE: f64 = 0.05;

/// Returns whether `candidate` passes every enabled check in `config`.
#[must_use]
pub fn accept(candidate: &Candidate, config: &FilterConfig) -> bool {
    let rejected_by = first_failing_check(candidate, config);
    if let Some(check) = rejected_by {
        trace!(id = %candidate.id, kind = %candidate.kind, check, "candidate rejected");
    }
    rejected_by.is_none()
}

fn first_failing_check(candidate: &Candidate, config: &FilterConfig) -> Option<&'static str> {
    if config.exclude_advertisements && candidate.is_advertisement {
        return Some("advertisement");
    }
    if !config.kinds.allows(candidate.kind) {
        return Some("kind");
    }
    if !config.restrictions.allows(candidate.restriction) {
        return Some("restriction");
    }
    if !config
        .page_counts
        .allows(candidate.kind, candidate.page_count)
    {
        return Some("page_count");
    }
    // Multi-page works have no single size and text works have none.
    // An unknown 0x0 size is compared like any other.
    if let Some(dimensions) = &config.dimensions
        && candidate.page_count == 1
        && candidate.kind != WorkKind::Text
        && !dimensions_pass(dimensions, candidate.width, candidate.height)
    {
        return Some("dimensions");
    }
    if let Some(target) = config.aspect_ratio
        && let Some((width, height)) = candidate.dimensions()
        && !ratio_passes(target, width, height)
    {
        return Some("aspect_ratio");
    }
    if let Some(range) = &config.bookmarks
        && !bookmarks_pass(range, candidate.bookmark_count)
    {
        return Some("bookmarks");
    }
    if let Some(tags) = &config.tags
        && !tags_pass(tags, candidate)
    {
        return Some("tags");
    }
    if let Some(owners) = &config.blocked_owners
        && owners.iter().any(|owner| *owner == candidate.owner_id)
    {
        return Some("blocked_owner");
    }
    if let Some(blocks) = &config.owner_tag_blocks
        && owner_tags_blocked(blocks, config, candidate)
    {
        return Some("owner_tags");
    }
    if let Some(range) = config.id_range
        && !id_in_range(range, &candidate.id)
    {
        return Some("id_range");
    }
    None
}

fn dimensions_pass(filter: &DimensionFilter, width: u32, height: u32) -> bool {
    let width_ok = filter.comparison.holds(width, filter.width);
    let height_ok = filter.comparison.holds(height, filter.height);
    match filter.combinator {
        Combinator::And => width_ok && height_ok,
        Combinator::Or => width_ok || height_ok,
    }
}

fn ratio_passes(target: AspectTarget, width: u32, height: u32) -> bool {
    let ratio = f64::from(width) / f64::from(height);
    match target {
        AspectTarget::Square => width == height,
        AspectTarget::Horizontal => width > height,
        AspectTarget::Vertical => width < height,
        AspectTarget::Custom(expected) => (ratio - expected).abs() <= CUSTOM_RATIO_TOLERANCE,
    }
}

fn bookmarks_pass(range: &BookmarkRange, count: Option<u64>) -> bool {
    match count {
        Some(count) => (range.min..=range.max).contains(&count),
        None => range.missing == MissingBookmarks::Accept,
    }
}

fn has_tag(candidate: &Candidate, target: &str, filter: &TagFilter) -> bool {
    candidate
        .tags
        .iter()
        .any(|tag| filter.matching.matches(tag, target))
}

fn tags_pass(filter: &TagFilter, candidate: &Candidate) -> bool {
    if !filter.required.is_empty() {
        let required_ok = match filter.required_mode {
            RequiredTagMode::All => filter
                .required
                .iter()
                .all(|target| has_tag(candidate, target, filter)),
            RequiredTagMode::Any => filter
                .required
                .iter()
                .any(|target| has_tag(candidate, target, filter)),
        };
        if !required_ok {
            return false;
        }
    }

    !filter
        .forbidden
        .iter()
        .any(|target| has_tag(candidate, target, filter))
}

fn owner_tags_blocked(
    blocks: &[OwnerTagBlock],
    config: &FilterConfig,
    candidate: &Candidate,
) -> bool {
    let matching = config.tags.as_ref().map(|t| t.matching).unwrap_or_default();
    blocks
        .iter()
        .filter(|block| block.owner_id == candidate.owner_id)
        .flat_map(|block| &block.tags)
        .any(|target| candidate.tags.iter().any(|tag| matching.matches(tag, target)))
}

/// Non-numeric ids cannot be ordered and pass.
fn id_in_range(range: IdRange, id: &str) -> bool {
    let Ok(id) = id.parse::<u64>() else {
        return true;
    };
    match range {
        IdRange::Above(bound) => id > bound,
        IdRange::Below(bound) => id < bound,
    }
}
