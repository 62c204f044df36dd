//! Error types for page sources.
//!
//! Adapters classify every failure before it reaches the pipeline. The
//! pipeline only looks at [`SourceError::failure_type`], never at transport
//! details.

use thiserror::Error;

/// Classification of a page-fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// May succeed if the same cursor is fetched again.
    ///
    /// Examples: timeout, connection refused, HTTP 429, 5xx responses.
    Transient,

    /// Will not succeed regardless of retries.
    ///
    /// Examples: malformed JSON, HTTP 404, an explicit error flag in the body.
    Permanent,
}

/// Errors returned by [`super::PageSource::fetch_page`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-level failure (DNS, connection refused, reset).
    #[error("network error fetching cursor {cursor} from {url}: {source}")]
    Network {
        /// Requested URL.
        url: String,
        /// Requested cursor.
        cursor: u64,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Request did not complete in time.
    #[error("timeout fetching cursor {cursor} from {url}")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Requested cursor.
        cursor: u64,
    },

    /// Non-success HTTP status.
    #[error("HTTP {status} fetching cursor {cursor} from {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Requested cursor.
        cursor: u64,
        /// Status code returned.
        status: u16,
    },

    /// Response could not be understood.
    #[error("malformed listing response for cursor {cursor}: {reason}")]
    Malformed {
        /// Requested cursor.
        cursor: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// Source reported an error in an otherwise well-formed response.
    #[error("listing source rejected cursor {cursor}: {message}")]
    Rejected {
        /// Requested cursor.
        cursor: u64,
        /// Message supplied by the source.
        message: String,
    },

    /// Listing endpoint could not be used to build requests.
    #[error("invalid listing endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Adapter-defined transient failure without a transport error.
    #[error("temporarily unavailable at cursor {cursor}: {reason}")]
    Unavailable {
        /// Requested cursor.
        cursor: u64,
        /// Adapter-supplied reason.
        reason: String,
    },
}

impl SourceError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, cursor: u64, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            cursor,
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>, cursor: u64) -> Self {
        Self::Timeout {
            url: url.into(),
            cursor,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, cursor: u64, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            cursor,
            status,
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(cursor: u64, reason: impl Into<String>) -> Self {
        Self::Malformed {
            cursor,
            reason: reason.into(),
        }
    }

    /// Creates a source-rejected error.
    pub fn rejected(cursor: u64, message: impl Into<String>) -> Self {
        Self::Rejected {
            cursor,
            message: message.into(),
        }
    }

    /// Creates an invalid-endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Creates a transient error for adapters without a transport error to wrap.
    pub fn unavailable(cursor: u64, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            cursor,
            reason: reason.into(),
        }
    }

    /// Classifies this error for retry decisions.
    ///
    /// # HTTP Status Classification
    ///
    /// | Status | Type |
    /// |--------|------|
    /// | 408 | Transient |
    /// | 429 | Transient |
    /// | 5xx | Transient |
    /// | other | Permanent |
    #[must_use]
    pub fn failure_type(&self) -> FailureType {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Unavailable { .. } => {
                FailureType::Transient
            }
            Self::HttpStatus { status, .. } => classify_http_status(*status),
            Self::Malformed { .. }
            | Self::Rejected { .. }
            | Self::InvalidEndpoint { .. }
            | Self::ClientBuild(_) => FailureType::Permanent,
        }
    }

    /// Returns true when retrying the same cursor may help.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.failure_type() == FailureType::Transient
    }
}

#[allow(clippy::match_same_arms)]
fn classify_http_status(status: u16) -> FailureType {
    match status {
        408 => FailureType::Transient, // Request Timeout
        429 => FailureType::Transient, // Too Many Requests
        status if (500..600).contains(&status) => FailureType::Transient,
        _ => FailureType::Permanent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_transient() {
        assert!(SourceError::timeout("http://example.com", 0).is_transient());
    }

    #[test]
    fn test_unavailable_is_transient() {
        assert_eq!(
            SourceError::unavailable(3, "maintenance").failure_type(),
            FailureType::Transient
        );
    }

    #[test]
    fn test_http_status_classification() {
        let cases = [
            (400, FailureType::Permanent),
            (403, FailureType::Permanent),
            (404, FailureType::Permanent),
            (408, FailureType::Transient),
            (429, FailureType::Transient),
            (500, FailureType::Transient),
            (503, FailureType::Transient),
            (599, FailureType::Transient),
            (304, FailureType::Permanent),
        ];
        for (status, expected) in cases {
            let error = SourceError::http_status("http://example.com", 0, status);
            assert_eq!(error.failure_type(), expected, "status {status}");
        }
    }

    #[test]
    fn test_malformed_and_rejected_are_permanent() {
        assert_eq!(
            SourceError::malformed(0, "expected value at line 1").failure_type(),
            FailureType::Permanent
        );
        assert_eq!(
            SourceError::rejected(0, "invalid mode").failure_type(),
            FailureType::Permanent
        );
    }

    #[test]
    fn test_error_messages_include_cursor() {
        let error = SourceError::http_status("http://example.com/list", 60, 503);
        let message = error.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("cursor 60"));
    }
}
