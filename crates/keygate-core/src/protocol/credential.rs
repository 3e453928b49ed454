//! Credential extraction from raw header values.
//!
//! Precedence is fixed: `sda_session` cookie → bearer API key (`msd_live_`
//! prefix) → bearer legacy session token → none.

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sda_session";

/// Prefix every API key carries.
pub const API_KEY_PREFIX: &str = "msd_live_";

const BEARER: &str = "Bearer ";

/// Where a session token was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// `sda_session` cookie (preferred transport).
    Cookie,
    /// `Authorization: Bearer` header (legacy transport, deprecated).
    Header,
}

impl SessionOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionOrigin::Cookie => "cookie",
            SessionOrigin::Header => "header",
        }
    }
}

/// Raw credential found on a request. Created per request, never persisted.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    ApiKey { value: String },
    Session { value: String, origin: SessionOrigin },
    None,
}

impl Credential {
    /// Scheme label for logs and metrics (never includes the secret).
    pub fn scheme(&self) -> &'static str {
        match self {
            Credential::ApiKey { .. } => "api_key",
            Credential::Session { .. } => "session",
            Credential::None => "none",
        }
    }

    /// True for session tokens that arrived on the legacy header transport.
    pub fn is_legacy_session(&self) -> bool {
        matches!(
            self,
            Credential::Session {
                origin: SessionOrigin::Header,
                ..
            }
        )
    }
}

// Secrets stay out of Debug output so credentials can't leak through logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::ApiKey { .. } => f.write_str("ApiKey { .. }"),
            Credential::Session { origin, .. } => f
                .debug_struct("Session")
                .field("origin", origin)
                .finish_non_exhaustive(),
            Credential::None => f.write_str("None"),
        }
    }
}

/// Extract a credential from the `Authorization` header value and any number
/// of `Cookie` header values.
///
/// Non-UTF-8 or malformed values are the caller's to drop; anything that does
/// not parse here yields `Credential::None`.
pub fn extract<'a, I>(authorization: Option<&str>, cookie_headers: I) -> Credential
where
    I: IntoIterator<Item = &'a str>,
{
    if let Some(token) = find_cookie(cookie_headers, SESSION_COOKIE) {
        return Credential::Session {
            value: token.to_string(),
            origin: SessionOrigin::Cookie,
        };
    }

    let Some(token) = authorization.and_then(bearer_token) else {
        return Credential::None;
    };

    if token.starts_with(API_KEY_PREFIX) {
        Credential::ApiKey {
            value: token.to_string(),
        }
    } else {
        Credential::Session {
            value: token.to_string(),
            origin: SessionOrigin::Header,
        }
    }
}

/// `Bearer <token>` → trimmed, non-empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix(BEARER)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// First non-empty value of cookie `name` across all cookie headers.
pub fn find_cookie<'a, I>(cookie_headers: I, name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    cookie_headers
        .into_iter()
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find_map(|(k, v)| {
            let v = v.trim();
            (k.trim() == name && !v.is_empty()).then_some(v)
        })
}
