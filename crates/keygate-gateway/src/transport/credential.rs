//! `HeaderMap` adapter for credential extraction.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

use keygate_core::protocol::credential::{extract, Credential};

/// Extract a credential from request headers. Non-UTF-8 values are ignored.
pub fn from_headers(headers: &HeaderMap) -> Credential {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let cookies = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok());
    extract(authorization, cookies)
}
