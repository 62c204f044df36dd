//! Settings file loading and normalization into a [`FilterConfig`].
//!
//! Settings are read from a JSON object. Both the current snake_case keys and
//! the legacy camelCase keys are recognised, values are coerced to the
//! expected type, out-of-range numbers are clamped, and tag and owner lists
//! are trimmed and deduplicated. Keys that do not affect filtering are
//! ignored, so a full exported settings file can be passed as-is.
//!
//! | Key | Legacy key | Type |
//! |-----|------------|------|
//! | `exclude_advertisements` | | bool |
//! | `download_image` | `downType0` | bool |
//! | `download_multi_image` | `downType1` | bool |
//! | `download_animated` | `downType2` | bool |
//! | `download_text` | `downType3` | bool |
//! | `download_unknown` | | bool |
//! | `download_all_ages` | `downAllAges` | bool |
//! | `download_r18` | `downR18` | bool |
//! | `download_r18g` | `downR18G` | bool |
//! | `download_single_page` | `downSingleImg` | bool |
//! | `download_multi_page` | `downMultiImg` | bool |
//! | `dimension_filter` | `setWHSwitch` | bool |
//! | `dimension_comparison` | `widthHeightLimit` | `>=` / `=` / `<=` |
//! | `dimension_combinator` | `setWidthAndOr` | `and` / `or` (`&` / `\|`) |
//! | `width` | `setWidth` | integer |
//! | `height` | `setHeight` | integer |
//! | `ratio_filter` | `ratioSwitch` | bool |
//! | `ratio` | `ratio` | `square` / `horizontal` / `vertical` / `custom` (`userSet`) |
//! | `custom_ratio` | `userRatio` | number |
//! | `bookmark_filter` | `BMKNumSwitch` | bool |
//! | `bookmark_min` | `BMKNumMin` | integer |
//! | `bookmark_max` | `BMKNumMax` | integer |
//! | `missing_bookmarks` | | `reject` / `accept` |
//! | `required_tags_filter` | `needTagSwitch` | bool |
//! | `required_tags` | `needTag` | list |
//! | `required_tag_mode` | `needTagMode` | `all` / `any` (`one`) |
//! | `forbidden_tags_filter` | `notNeedTagSwitch` | bool |
//! | `forbidden_tags` | `notNeedTag` | list |
//! | `tag_match` | `tagMatchMode` | `whole` / `partial` |
//! | `owner_block_filter` | `userBlockList` | bool |
//! | `blocked_owners` | `blockList` | list |
//! | `owner_tag_block_filter` | `blockTagsForSpecificUser` | bool |
//! | `owner_tag_blocks` | `blockTagsForSpecificUserList` | list of `{uid, tags}` |
//! | `id_range_filter` | `idRangeSwitch` | bool |
//! | `id_range_bound` | `idRangeInput` | integer |
//! | `id_range` | `idRange` | `>` / `<` |
//!
//! # Example
//!
//! ```
//! use discovery_core::settings::Settings;
//!
//! let settings = Settings::from_json_str(r#"{"notNeedTagSwitch": true, "notNeedTag": "NSFW, gore"}"#)?;
//! let config = settings.to_filter_config()?;
//! assert_eq!(config.tags.unwrap().forbidden, vec!["nsfw", "gore"]);
//! # Ok::<(), discovery_core::settings::SettingsError>(())
//! ```

mod coerce;
mod error;

pub use error::SettingsError;

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::filter::{
    AspectTarget, BOOKMARK_COUNT_LIMIT, BookmarkRange, Combinator, Comparison, DimensionFilter,
    FilterConfig, IdRange, KindToggles, MissingBookmarks, OwnerTagBlock, PageCountToggles,
    RequiredTagMode, RestrictionToggles, TagFilter, TagMatch,
};

/// Default custom width/height ratio.
pub const DEFAULT_CUSTOM_RATIO: f64 = 1.4;

/// Largest accepted width or height bound.
const DIMENSION_LIMIT: u64 = u32::MAX as u64;

/// Aspect-ratio shape selected in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatioShape {
    /// Width equals height.
    Square,
    /// Wider than tall.
    #[default]
    Horizontal,
    /// Taller than wide.
    Vertical,
    /// Uses [`Settings::custom_ratio`].
    Custom,
}

/// Which side of the id bound to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdDirection {
    /// Keep ids greater than the bound.
    #[default]
    Above,
    /// Keep ids less than the bound.
    Below,
}

/// Normalized filter settings.
///
/// Every list is already trimmed and deduplicated, tags are lowercase, and
/// bookmark bounds are ordered and clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Reject advertisement slots.
    pub exclude_advertisements: bool,
    /// Work kinds to keep.
    pub kinds: KindToggles,
    /// Restriction levels to keep.
    pub restrictions: RestrictionToggles,
    /// Single-page and multi-page switches.
    pub page_counts: PageCountToggles,

    /// Enables the width/height check.
    pub dimension_filter: bool,
    /// Operator for the width/height check.
    pub dimension_comparison: Comparison,
    /// How width and height results combine.
    pub dimension_combinator: Combinator,
    /// Width bound in pixels.
    pub width: u32,
    /// Height bound in pixels.
    pub height: u32,

    /// Enables the aspect-ratio check.
    pub ratio_filter: bool,
    /// Shape to keep.
    pub ratio: RatioShape,
    /// Width/height ratio used by [`RatioShape::Custom`].
    pub custom_ratio: f64,

    /// Enables the bookmark-count check.
    pub bookmark_filter: bool,
    /// Lowest accepted bookmark count.
    pub bookmark_min: u64,
    /// Highest accepted bookmark count.
    pub bookmark_max: u64,
    /// Policy for works without a bookmark count.
    pub missing_bookmarks: MissingBookmarks,

    /// Enables the required-tag check.
    pub required_tags_filter: bool,
    /// Lowercase tags a work must carry.
    pub required_tags: Vec<String>,
    /// All-of or any-of for `required_tags`.
    pub required_tag_mode: RequiredTagMode,
    /// Enables the forbidden-tag check.
    pub forbidden_tags_filter: bool,
    /// Lowercase tags a work must not carry.
    pub forbidden_tags: Vec<String>,
    /// Whole or partial tag comparison.
    pub tag_match: TagMatch,

    /// Enables the owner block list.
    pub owner_block_filter: bool,
    /// Owners whose works are rejected.
    pub blocked_owners: Vec<String>,
    /// Enables per-owner tag blocks.
    pub owner_tag_block_filter: bool,
    /// Per-owner tag blocks, one entry per owner.
    pub owner_tag_blocks: Vec<OwnerTagBlock>,

    /// Enables the id bound.
    pub id_range_filter: bool,
    /// Numeric id bound.
    pub id_range_bound: u64,
    /// Side of the bound to keep.
    pub id_range: IdDirection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exclude_advertisements: true,
            kinds: KindToggles::default(),
            restrictions: RestrictionToggles::default(),
            page_counts: PageCountToggles::default(),
            dimension_filter: false,
            dimension_comparison: Comparison::AtLeast,
            dimension_combinator: Combinator::And,
            width: 0,
            height: 0,
            ratio_filter: false,
            ratio: RatioShape::default(),
            custom_ratio: DEFAULT_CUSTOM_RATIO,
            bookmark_filter: false,
            bookmark_min: 0,
            bookmark_max: BOOKMARK_COUNT_LIMIT,
            missing_bookmarks: MissingBookmarks::default(),
            required_tags_filter: false,
            required_tags: Vec::new(),
            required_tag_mode: RequiredTagMode::default(),
            forbidden_tags_filter: false,
            forbidden_tags: Vec::new(),
            tag_match: TagMatch::default(),
            owner_block_filter: false,
            blocked_owners: Vec::new(),
            owner_tag_block_filter: false,
            owner_tag_blocks: Vec::new(),
            id_range_filter: false,
            id_range_bound: 0,
            id_range: IdDirection::default(),
        }
    }
}

/// Attaches the key name to a coercion failure, keeping the default for
/// missing values.
fn read<T>(key: &str, parsed: Result<Option<T>, String>) -> Result<Option<T>, SettingsError> {
    parsed.map_err(|reason| SettingsError::invalid_value(key, reason))
}

fn set<T>(
    target: &mut T,
    key: &str,
    parsed: Result<Option<T>, String>,
) -> Result<(), SettingsError> {
    if let Some(value) = read(key, parsed)? {
        *target = value;
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn dimension(value: &Value) -> Result<Option<u32>, String> {
    // Clamped to DIMENSION_LIMIT, so the cast cannot truncate.
    coerce::integer(value, DIMENSION_LIMIT).map(|n| n.map(|n| n as u32))
}

/// Trims, drops empties and removes repeats, keeping first occurrences.
fn dedup_entries(entries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty() && seen.insert(entry.clone()))
        .collect()
}

/// Like [`dedup_entries`], lowercasing first.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    dedup_entries(tags.into_iter().map(|tag| tag.to_lowercase()).collect())
}

fn owner_tag_blocks(key: &str, value: &Value) -> Result<Option<Vec<OwnerTagBlock>>, SettingsError> {
    let items = match value {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        _ => return Err(SettingsError::invalid_value(key, "expected a list of {uid, tags}")),
    };

    let mut blocks: Vec<OwnerTagBlock> = Vec::new();
    for item in items {
        let Value::Object(entry) = item else {
            return Err(SettingsError::invalid_value(key, "entries must be objects"));
        };
        let owner = entry
            .get("uid")
            .or_else(|| entry.get("owner_id"))
            .map(|uid| match uid {
                Value::String(s) => Ok(s.trim().to_string()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(SettingsError::invalid_value(key, "uid must be text or a number")),
            })
            .transpose()?
            .unwrap_or_default();
        let tags = match entry.get("tags") {
            Some(tags) => read(key, coerce::string_list(tags))?.unwrap_or_default(),
            None => Vec::new(),
        };
        let tags = normalize_tags(tags);

        if owner.is_empty() || tags.is_empty() {
            debug!(owner = %owner, "skipping incomplete owner tag block");
            continue;
        }
        // Merge repeated owners so each owner has one entry.
        if let Some(existing) = blocks.iter_mut().find(|block| block.owner_id == owner) {
            let merged: Vec<String> = existing.tags.drain(..).chain(tags).collect();
            existing.tags = dedup_entries(merged);
        } else {
            blocks.push(OwnerTagBlock {
                owner_id: owner,
                tags,
            });
        }
    }
    Ok(Some(blocks))
}

impl Settings {
    /// Reads and normalizes a settings file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] if the file cannot be read, otherwise
    /// see [`Settings::from_json_str`].
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parses and normalizes settings from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Json`] for invalid JSON,
    /// [`SettingsError::NotAnObject`] if the top level is not an object, or
    /// [`SettingsError::InvalidValue`] for a known key whose value cannot be
    /// coerced.
    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        let value: Value = serde_json::from_str(raw)?;
        match value {
            Value::Object(map) => Self::from_map(&map),
            Value::Array(_) => Err(SettingsError::NotAnObject { found: "array" }),
            Value::String(_) => Err(SettingsError::NotAnObject { found: "string" }),
            Value::Number(_) => Err(SettingsError::NotAnObject { found: "number" }),
            Value::Bool(_) => Err(SettingsError::NotAnObject { found: "boolean" }),
            Value::Null => Err(SettingsError::NotAnObject { found: "null" }),
        }
    }

    /// Normalizes settings from an already-parsed JSON object.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_json_str`].
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, SettingsError> {
        let mut s = Self::default();
        let mut ignored = 0_usize;

        for (key, value) in map {
            let k = key.as_str();
            match k {
                "exclude_advertisements" => {
                    set(&mut s.exclude_advertisements, k, coerce::boolean(value))?;
                }
                "download_image" | "downType0" => set(&mut s.kinds.image, k, coerce::boolean(value))?,
                "download_multi_image" | "downType1" => {
                    set(&mut s.kinds.multi_image, k, coerce::boolean(value))?;
                }
                "download_animated" | "downType2" => {
                    set(&mut s.kinds.animated, k, coerce::boolean(value))?;
                }
                "download_text" | "downType3" => set(&mut s.kinds.text, k, coerce::boolean(value))?,
                "download_unknown" => set(&mut s.kinds.unknown, k, coerce::boolean(value))?,
                "download_all_ages" | "downAllAges" => {
                    set(&mut s.restrictions.all_ages, k, coerce::boolean(value))?;
                }
                "download_r18" | "downR18" => {
                    set(&mut s.restrictions.r18, k, coerce::boolean(value))?;
                }
                "download_r18g" | "downR18G" => {
                    set(&mut s.restrictions.r18g, k, coerce::boolean(value))?;
                }
                "download_single_page" | "downSingleImg" => {
                    set(&mut s.page_counts.single_page, k, coerce::boolean(value))?;
                }
                "download_multi_page" | "downMultiImg" => {
                    set(&mut s.page_counts.multi_page, k, coerce::boolean(value))?;
                }
                "dimension_filter" | "setWHSwitch" => {
                    set(&mut s.dimension_filter, k, coerce::boolean(value))?;
                }
                "dimension_comparison" | "widthHeightLimit" => {
                    set(&mut s.dimension_comparison, k, coerce::comparison(value))?;
                }
                "dimension_combinator" | "setWidthAndOr" => {
                    set(&mut s.dimension_combinator, k, coerce::combinator(value))?;
                }
                "width" | "setWidth" => set(&mut s.width, k, dimension(value))?,
                "height" | "setHeight" => set(&mut s.height, k, dimension(value))?,
                "ratio_filter" | "ratioSwitch" => set(&mut s.ratio_filter, k, coerce::boolean(value))?,
                "ratio" => set(&mut s.ratio, k, coerce::ratio_shape(value))?,
                "custom_ratio" | "userRatio" => set(&mut s.custom_ratio, k, coerce::float(value))?,
                "bookmark_filter" | "BMKNumSwitch" => {
                    set(&mut s.bookmark_filter, k, coerce::boolean(value))?;
                }
                "bookmark_min" | "BMKNumMin" => set(
                    &mut s.bookmark_min,
                    k,
                    coerce::integer(value, BOOKMARK_COUNT_LIMIT),
                )?,
                "bookmark_max" | "BMKNumMax" => set(
                    &mut s.bookmark_max,
                    k,
                    coerce::integer(value, BOOKMARK_COUNT_LIMIT),
                )?,
                "missing_bookmarks" => {
                    set(&mut s.missing_bookmarks, k, coerce::missing_bookmarks(value))?;
                }
                "required_tags_filter" | "needTagSwitch" => {
                    set(&mut s.required_tags_filter, k, coerce::boolean(value))?;
                }
                "required_tags" | "needTag" => {
                    set(&mut s.required_tags, k, coerce::string_list(value))?;
                }
                "required_tag_mode" | "needTagMode" => {
                    set(&mut s.required_tag_mode, k, coerce::required_tag_mode(value))?;
                }
                "forbidden_tags_filter" | "notNeedTagSwitch" => {
                    set(&mut s.forbidden_tags_filter, k, coerce::boolean(value))?;
                }
                "forbidden_tags" | "notNeedTag" => {
                    set(&mut s.forbidden_tags, k, coerce::string_list(value))?;
                }
                "tag_match" | "tagMatchMode" => set(&mut s.tag_match, k, coerce::tag_match(value))?,
                "owner_block_filter" | "userBlockList" => {
                    set(&mut s.owner_block_filter, k, coerce::boolean(value))?;
                }
                "blocked_owners" | "blockList" => {
                    set(&mut s.blocked_owners, k, coerce::string_list(value))?;
                }
                "owner_tag_block_filter" | "blockTagsForSpecificUser" => {
                    set(&mut s.owner_tag_block_filter, k, coerce::boolean(value))?;
                }
                "owner_tag_blocks" | "blockTagsForSpecificUserList" => {
                    if let Some(blocks) = owner_tag_blocks(k, value)? {
                        s.owner_tag_blocks = blocks;
                    }
                }
                "id_range_filter" | "idRangeSwitch" => {
                    set(&mut s.id_range_filter, k, coerce::boolean(value))?;
                }
                "id_range_bound" | "idRangeInput" => {
                    set(&mut s.id_range_bound, k, coerce::integer(value, u64::MAX))?;
                }
                "id_range" | "idRange" => set(&mut s.id_range, k, coerce::id_direction(value))?,
                _ => ignored += 1,
            }
        }

        s.normalize();
        debug!(ignored, "settings loaded");
        Ok(s)
    }

    /// Clamps and tidies values that parsed but are out of shape.
    fn normalize(&mut self) {
        if self.bookmark_min > self.bookmark_max {
            warn!(
                min = self.bookmark_min,
                max = self.bookmark_max,
                "bookmark bounds inverted, swapping"
            );
            std::mem::swap(&mut self.bookmark_min, &mut self.bookmark_max);
        }
        if !(self.custom_ratio.is_finite() && self.custom_ratio > 0.0) {
            warn!(
                ratio = self.custom_ratio,
                "custom ratio must be positive, using default"
            );
            self.custom_ratio = DEFAULT_CUSTOM_RATIO;
        }
        self.required_tags = normalize_tags(std::mem::take(&mut self.required_tags));
        self.forbidden_tags = normalize_tags(std::mem::take(&mut self.forbidden_tags));
        self.blocked_owners = dedup_entries(std::mem::take(&mut self.blocked_owners));
    }

    /// Builds the immutable filter snapshot for a run.
    ///
    /// A filter switch whose list is empty is treated as disabled.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Config`] when the result still fails
    /// [`FilterConfig::validate`], e.g. every work kind is disabled.
    pub fn to_filter_config(&self) -> Result<FilterConfig, SettingsError> {
        let dimensions = self.dimension_filter.then_some(DimensionFilter {
            comparison: self.dimension_comparison,
            combinator: self.dimension_combinator,
            width: self.width,
            height: self.height,
        });

        let aspect_ratio = self.ratio_filter.then_some(match self.ratio {
            RatioShape::Square => AspectTarget::Square,
            RatioShape::Horizontal => AspectTarget::Horizontal,
            RatioShape::Vertical => AspectTarget::Vertical,
            RatioShape::Custom => AspectTarget::Custom(self.custom_ratio),
        });

        let bookmarks = self.bookmark_filter.then_some(BookmarkRange {
            min: self.bookmark_min,
            max: self.bookmark_max,
            missing: self.missing_bookmarks,
        });

        let required = if self.required_tags_filter {
            self.required_tags.clone()
        } else {
            Vec::new()
        };
        let forbidden = if self.forbidden_tags_filter {
            self.forbidden_tags.clone()
        } else {
            Vec::new()
        };
        let tags = (!required.is_empty() || !forbidden.is_empty()).then(|| TagFilter {
            required,
            required_mode: self.required_tag_mode,
            forbidden,
            matching: self.tag_match,
        });

        let blocked_owners = (self.owner_block_filter && !self.blocked_owners.is_empty())
            .then(|| self.blocked_owners.clone());
        let owner_tag_blocks = (self.owner_tag_block_filter && !self.owner_tag_blocks.is_empty())
            .then(|| self.owner_tag_blocks.clone());

        let id_range = self.id_range_filter.then_some(match self.id_range {
            IdDirection::Above => IdRange::Above(self.id_range_bound),
            IdDirection::Below => IdRange::Below(self.id_range_bound),
        });

        let config = FilterConfig {
            exclude_advertisements: self.exclude_advertisements,
            kinds: self.kinds,
            restrictions: self.restrictions,
            page_counts: self.page_counts,
            dimensions,
            aspect_ratio,
            bookmarks,
            tags,
            blocked_owners,
            owner_tag_blocks,
            id_range,
        };
        config.validate()?;
        Ok(config)
    }
}
