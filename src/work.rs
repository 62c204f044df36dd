//! Candidate works and their identifying keys.
//!
//! A [`Candidate`] is built fresh from every page a [`crate::source::PageSource`]
//! returns and is never mutated afterwards. The pipeline only keeps the
//! [`WorkKey`] of candidates that survive filtering and deduplication.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Classification of a discoverable work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkKind {
    /// Single or multi-page illustration.
    Image,
    /// Comic-style work made of several images.
    MultiImage,
    /// Frame-based animation.
    Animated,
    /// Prose work.
    Text,
    /// Source did not say what the work is.
    Unknown,
}

impl WorkKind {
    /// All kinds, in storage order.
    pub const ALL: [Self; 5] = [
        Self::Image,
        Self::MultiImage,
        Self::Animated,
        Self::Text,
        Self::Unknown,
    ];

    /// Returns the storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::MultiImage => "multi_image",
            Self::Animated => "animated",
            Self::Text => "text",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WorkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "image" => Ok(Self::Image),
            "multi_image" => Ok(Self::MultiImage),
            "animated" => Ok(Self::Animated),
            "text" => Ok(Self::Text),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("invalid work kind: {value}")),
        }
    }
}

/// Audience restriction attached to a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestrictionLevel {
    /// Suitable for all ages.
    AllAges,
    /// Adult content.
    R18,
    /// Adult content with graphic material.
    R18G,
}

impl RestrictionLevel {
    /// Returns the storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllAges => "all_ages",
            Self::R18 => "r18",
            Self::R18G => "r18g",
        }
    }
}

impl fmt::Display for RestrictionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a work for deduplication: ids are only unique within a kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkKey {
    /// Kind the id belongs to.
    pub kind: WorkKind,
    /// Source-assigned identifier.
    pub id: String,
}

impl WorkKey {
    /// Creates a key from a kind and id.
    #[must_use]
    pub fn new(kind: WorkKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for WorkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for WorkKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, id) = value
            .split_once(':')
            .ok_or_else(|| format!("invalid work key (expected kind:id): {value}"))?;
        if id.is_empty() {
            return Err(format!("invalid work key (empty id): {value}"));
        }
        Ok(Self::new(kind.parse()?, id))
    }
}

/// One discoverable work as reported by a page source.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Source-assigned identifier, usually numeric.
    pub id: String,
    /// Work classification.
    pub kind: WorkKind,
    /// Pixel width of the first page; zero when unknown.
    pub width: u32,
    /// Pixel height of the first page; zero when unknown.
    pub height: u32,
    /// Number of pages, at least one.
    pub page_count: u32,
    /// Tags attached to the work.
    pub tags: BTreeSet<String>,
    /// Identifier of the owning account.
    pub owner_id: String,
    /// Audience restriction.
    pub restriction: RestrictionLevel,
    /// Bookmark count when the source exposes it.
    pub bookmark_count: Option<u64>,
    /// Promoted placeholder rather than a real work.
    pub is_advertisement: bool,
}

impl Candidate {
    /// Creates a single-page, all-ages candidate with no tags or dimensions.
    #[must_use]
    pub fn new(kind: WorkKind, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            width: 0,
            height: 0,
            page_count: 1,
            tags: BTreeSet::new(),
            owner_id: String::new(),
            restriction: RestrictionLevel::AllAges,
            bookmark_count: None,
            is_advertisement: false,
        }
    }

    /// Sets the pixel dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the page count (clamped to at least one).
    #[must_use]
    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = page_count.max(1);
        self
    }

    /// Replaces the tag set.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the owner id.
    #[must_use]
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    /// Sets the restriction level.
    #[must_use]
    pub fn with_restriction(mut self, restriction: RestrictionLevel) -> Self {
        self.restriction = restriction;
        self
    }

    /// Sets the bookmark count.
    #[must_use]
    pub fn with_bookmarks(mut self, count: u64) -> Self {
        self.bookmark_count = Some(count);
        self
    }

    /// Marks the candidate as an advertisement slot.
    #[must_use]
    pub fn advertisement(mut self) -> Self {
        self.is_advertisement = true;
        self
    }

    /// Returns the deduplication key.
    #[must_use]
    pub fn key(&self) -> WorkKey {
        WorkKey::new(self.kind, self.id.clone())
    }

    /// Returns `(width, height)` when both are known.
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        (self.width > 0 && self.height > 0).then_some((self.width, self.height))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_work_kind_storage_names_parse_back() {
        for kind in WorkKind::ALL {
            assert_eq!(kind.as_str().parse::<WorkKind>().unwrap(), kind);
        }
        assert!("illust".parse::<WorkKind>().is_err());
    }

    #[test]
    fn test_work_key_display_and_parse() {
        let key = WorkKey::new(WorkKind::Animated, "44298467");
        assert_eq!(key.to_string(), "animated:44298467");
        assert_eq!("animated:44298467".parse::<WorkKey>().unwrap(), key);
    }

    #[test]
    fn test_work_key_parse_rejects_missing_parts() {
        assert!("44298467".parse::<WorkKey>().is_err());
        assert!("image:".parse::<WorkKey>().is_err());
        assert!("comic:1".parse::<WorkKey>().is_err());
    }

    #[test]
    fn test_same_id_different_kind_is_different_key() {
        let image = Candidate::new(WorkKind::Image, "100").key();
        let text = Candidate::new(WorkKind::Text, "100").key();
        assert_ne!(image, text);
    }

    #[test]
    fn test_dimensions_require_both_sides() {
        assert_eq!(Candidate::new(WorkKind::Image, "1").dimensions(), None);
        let c = Candidate::new(WorkKind::Image, "1").with_dimensions(1920, 0);
        assert_eq!(c.dimensions(), None);
        let c = Candidate::new(WorkKind::Image, "1").with_dimensions(1920, 1080);
        assert_eq!(c.dimensions(), Some((1920, 1080)));
    }

    #[test]
    fn test_page_count_never_below_one() {
        let c = Candidate::new(WorkKind::MultiImage, "1").with_page_count(0);
        assert_eq!(c.page_count, 1);
    }
}
