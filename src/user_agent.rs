//! Shared User-Agent string for listing requests.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/discovery";

/// Default User-Agent for page source requests.
#[must_use]
pub(crate) fn default_source_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("discovery/{version} (listing-crawler; +{PROJECT_UA_URL})")
}
