//! Verdict → HTTP response helpers.
//!
//! Body: `{"error": "<message>", "code": "<CLIENT_CODE>"}`. Rate-limit headers
//! ride along whenever the verdict carries a limiter view.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use keygate_core::verdict::{Denial, RateLimitStatus};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// HTTP rendering of a `Denial`.
#[derive(Debug)]
pub struct Rejection(pub Denial);

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let denial = self.0;
        let status = StatusCode::from_u16(denial.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "error": denial.message,
            "code": denial.kind.as_str(),
        }));

        let mut resp = (status, body).into_response();
        if let Some(rl) = &denial.rate_limit {
            insert_rate_limit_headers(resp.headers_mut(), rl);
        }
        resp
    }
}

/// `X-RateLimit-Limit`, `X-RateLimit-Remaining`, and `Retry-After` when set.
pub fn insert_rate_limit_headers(headers: &mut HeaderMap, rl: &RateLimitStatus) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(rl.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(rl.remaining));
    if let Some(secs) = rl.retry_after_secs {
        headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_core::error::ErrorKind;

    #[test]
    fn rate_limited_carries_headers() {
        let resp = Rejection(Denial::rate_limited(100, 42)).into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        let h = resp.headers();
        assert_eq!(h.get("x-ratelimit-limit").unwrap(), "100");
        assert_eq!(h.get("x-ratelimit-remaining").unwrap(), "0");
        assert_eq!(h.get("retry-after").unwrap(), "42");
    }

    #[test]
    fn plain_denial_has_no_rate_headers() {
        let resp = Rejection(Denial::new(ErrorKind::ServiceUnavailable)).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.headers().get("retry-after").is_none());
    }
}
