use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

#[must_use]
pub fn socket_tests_required() -> bool {
    std::env::var("DISCOVERY_REQUIRE_SOCKET_TESTS")
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let location = Location::caller();
    let message = format!(
        "[socket-bound-test] cannot bind localhost socket at {}:{}; listing mock cannot run here",
        location.file(),
        location.line()
    );
    if socket_tests_required() {
        panic!("{message}. Set DISCOVERY_REQUIRE_SOCKET_TESTS=0 to allow local skips.");
    }

    eprintln!("{message}. Skipping test. Set DISCOVERY_REQUIRE_SOCKET_TESTS=1 to fail instead.");
    true
}

pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if should_skip_socket_bound_test() {
        None
    } else {
        Some(MockServer::start().await)
    }
}

/// Builds a listing body with one image work per id.
#[allow(dead_code)]
#[must_use]
pub fn listing_body(ids: &[&str]) -> serde_json::Value {
    let works: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "illustType": 0,
                "width": 1000,
                "height": 1400,
                "pageCount": 1,
                "tags": ["landscape"],
                "userId": "7",
                "xRestrict": 0,
                "bookmarkCount": 10
            })
        })
        .collect();
    serde_json::json!({ "error": false, "message": "", "body": { "works": works } })
}
