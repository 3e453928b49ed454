//! Fixed CORS policy for gateway-guarded endpoints.
//!
//! Any origin is allowed: the credential is an explicit header (or an
//! HttpOnly SameSite cookie), not something a cross-site page can attach to a
//! forged API-key request.

use std::time::Duration;

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Preflight cache lifetime (24h).
pub const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(PREFLIGHT_MAX_AGE)
}
