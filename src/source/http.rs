//! Page source for JSON listing endpoints.
//!
//! Issues `GET <endpoint>?offset=<cursor>&limit=<page_size>` and expects:
//!
//! ```text
//! { "error": false, "message": "", "body": { "works": [ { "id": "123", "illustType": 0, ... } ] } }
//! ```
//!
//! An empty `works` array means the listing is exhausted. The cursor is an
//! offset, so the next cursor is the current one plus the number of works
//! returned.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::{PageResult, PageSource, SourceError};
use crate::user_agent;
use crate::work::{Candidate, RestrictionLevel, WorkKind};

/// Default number of works requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 60;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

// ==================== Listing API Response Types ====================

#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: String,
    body: Option<ListingBody>,
}

#[derive(Debug, Deserialize)]
struct ListingBody {
    #[serde(default)]
    works: Vec<WorkRecord>,
}

/// Ids arrive as strings from some endpoints and as numbers from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(u64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

fn default_page_count() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkRecord {
    id: Option<WireId>,
    illust_type: Option<u8>,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default = "default_page_count")]
    page_count: u32,
    #[serde(default)]
    tags: Vec<String>,
    user_id: Option<WireId>,
    #[serde(default)]
    x_restrict: u8,
    bookmark_count: Option<u64>,
    #[serde(default)]
    is_ad_container: bool,
}

impl WorkRecord {
    fn into_candidate(self, cursor: u64) -> Result<Candidate, SourceError> {
        // Ad slots carry no id; they are kept so the filter can count them.
        let id = match self.id {
            Some(id) => id.into_string(),
            None if self.is_ad_container => String::new(),
            None => return Err(SourceError::malformed(cursor, "work record without id")),
        };

        let restriction = match self.x_restrict {
            0 => RestrictionLevel::AllAges,
            1 => RestrictionLevel::R18,
            2 => RestrictionLevel::R18G,
            other => {
                return Err(SourceError::malformed(
                    cursor,
                    format!("work {id} has unknown xRestrict {other}"),
                ));
            }
        };

        let mut candidate = Candidate::new(kind_from_wire(self.illust_type), id)
            .with_dimensions(self.width, self.height)
            .with_page_count(self.page_count)
            .with_tags(self.tags)
            .with_restriction(restriction);
        if let Some(owner) = self.user_id {
            candidate = candidate.with_owner(owner.into_string());
        }
        if let Some(count) = self.bookmark_count {
            candidate = candidate.with_bookmarks(count);
        }
        if self.is_ad_container {
            candidate = candidate.advertisement();
        }
        Ok(candidate)
    }
}

fn kind_from_wire(illust_type: Option<u8>) -> WorkKind {
    match illust_type {
        Some(0) => WorkKind::Image,
        Some(1) => WorkKind::MultiImage,
        Some(2) => WorkKind::Animated,
        Some(3) => WorkKind::Text,
        _ => WorkKind::Unknown,
    }
}

// ==================== HttpPageSource ====================

/// Request settings for [`HttpPageSource`].
#[derive(Debug, Clone, Copy)]
pub struct HttpSourceOptions {
    /// Works requested per page.
    pub page_size: u32,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub read_timeout: Duration,
}

impl Default for HttpSourceOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
        }
    }
}

/// Offset-paginated JSON listing adapter.
pub struct HttpPageSource {
    client: Client,
    endpoint: Url,
    page_size: u32,
}

impl HttpPageSource {
    /// Creates a source for `endpoint` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidEndpoint`] if the endpoint is not an
    /// absolute http(s) URL, or [`SourceError::ClientBuild`] if the HTTP
    /// client cannot be constructed.
    pub fn new(endpoint: &str) -> Result<Self, SourceError> {
        Self::with_options(endpoint, HttpSourceOptions::default())
    }

    /// Creates a source for `endpoint` with explicit options.
    ///
    /// # Errors
    ///
    /// See [`HttpPageSource::new`].
    #[instrument(skip(options), fields(page_size = options.page_size))]
    pub fn with_options(endpoint: &str, options: HttpSourceOptions) -> Result<Self, SourceError> {
        let parsed = Url::parse(endpoint)
            .map_err(|e| SourceError::invalid_endpoint(endpoint, e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::invalid_endpoint(
                endpoint,
                "scheme must be http or https",
            ));
        }
        if options.page_size == 0 {
            return Err(SourceError::invalid_endpoint(
                endpoint,
                "page size must be at least 1",
            ));
        }

        let client = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.read_timeout)
            .user_agent(user_agent::default_source_user_agent())
            .gzip(true)
            .build()
            .map_err(SourceError::ClientBuild)?;

        debug!(endpoint = %parsed, "created HTTP page source");
        Ok(Self {
            client,
            endpoint: parsed,
            page_size: options.page_size,
        })
    }

    /// Returns the configured page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn page_url(&self, cursor: u64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("offset", &cursor.to_string())
            .append_pair("limit", &self.page_size.to_string());
        url
    }
}

impl std::fmt::Debug for HttpPageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageSource")
            .field("endpoint", &self.endpoint.as_str())
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

fn transport_error(url: &Url, cursor: u64, error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::timeout(url.as_str(), cursor)
    } else {
        SourceError::network(url.as_str(), cursor, error)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self), fields(source = "http"))]
    async fn fetch_page(&self, cursor: u64) -> Result<PageResult, SourceError> {
        let url = self.page_url(cursor);
        debug!(url = %url, "requesting listing page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(&url, cursor, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "listing request failed");
            return Err(SourceError::http_status(
                url.as_str(),
                cursor,
                status.as_u16(),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, cursor, e))?;
        let listing: ListingResponse = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::malformed(cursor, e.to_string()))?;

        if listing.error {
            return Err(SourceError::rejected(cursor, listing.message));
        }
        let body = listing
            .body
            .ok_or_else(|| SourceError::malformed(cursor, "response has no body"))?;

        if body.works.is_empty() {
            debug!("listing exhausted");
            return Ok(PageResult::Exhausted);
        }

        let records = body
            .works
            .into_iter()
            .map(|work| work.into_candidate(cursor))
            .collect::<Result<Vec<_>, _>>()?;
        let next_cursor = cursor + records.len() as u64;

        debug!(records = records.len(), next_cursor, "listing page decoded");
        Ok(PageResult::Records {
            records,
            next_cursor,
        })
    }
}
