//! Gateway verdicts: one immutable allow/deny outcome per request.

use crate::error::ErrorKind;
use crate::principal::Principal;

/// Limiter view attached to API-key requests (drives `X-RateLimit-*` headers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the window resets; only set when the request was limited.
    pub retry_after_secs: Option<u64>,
}

/// Successful authorization context handed to downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub principal: Principal,
    /// Present for API-key principals only; sessions are not rate limited.
    pub rate_limit: Option<RateLimitStatus>,
}

/// Structured denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub kind: ErrorKind,
    pub message: String,
    pub rate_limit: Option<RateLimitStatus>,
}

impl Denial {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            rate_limit: None,
        }
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            rate_limit: None,
        }
    }

    /// `RateLimited` denial carrying the retry hint.
    pub fn rate_limited(limit: u32, retry_after_secs: u64) -> Self {
        Self {
            kind: ErrorKind::RateLimited,
            message: format!("Rate limit exceeded. Try again in {retry_after_secs} seconds."),
            rate_limit: Some(RateLimitStatus {
                limit,
                remaining: 0,
                retry_after_secs: Some(retry_after_secs),
            }),
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        self.rate_limit.and_then(|r| r.retry_after_secs)
    }
}

/// Gateway outcome for one request. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Authorized(Authorization),
    Denied(Denial),
}

impl Verdict {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Verdict::Authorized(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Verdict::Authorized(a) => Some(&a.principal),
            Verdict::Denied(_) => None,
        }
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Verdict::Denied(d) => Some(d),
            Verdict::Authorized(_) => None,
        }
    }

    /// Deny kind, `None` when authorized.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.denial().map(|d| d.kind)
    }

    /// HTTP status the transport should answer with (200 when authorized).
    pub fn http_status(&self) -> u16 {
        match self {
            Verdict::Authorized(_) => 200,
            Verdict::Denied(d) => d.http_status(),
        }
    }
}

impl From<Denial> for Verdict {
    fn from(d: Denial) -> Self {
        Verdict::Denied(d)
    }
}
