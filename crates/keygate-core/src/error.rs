//! Shared error types across keygate crates.

use thiserror::Error;

/// Deny taxonomy of the gateway (stable client-facing API).
///
/// Every failed authorization maps to exactly one kind. The kind fixes the
/// HTTP status; transport layers must not invent their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No usable credential found.
    MissingCredential,
    /// Credential present but the identity store rejects it.
    InvalidCredential,
    /// Session resolved, but the user has no tenant association.
    NoOrganization,
    /// API-key principal exceeded its window quota.
    RateLimited,
    /// Organization suspended or canceled.
    SubscriptionInactive,
    /// Organization is read-only and a non-safe method was attempted.
    ReadOnlyRestriction,
    /// Principal lacks the required permission.
    InsufficientPermission,
    /// Identity store unreachable, errored or timed out.
    ServiceUnavailable,
}

impl ErrorKind {
    /// String representation used in JSON responses and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingCredential => "MISSING_CREDENTIAL",
            ErrorKind::InvalidCredential => "INVALID_CREDENTIAL",
            ErrorKind::NoOrganization => "NO_ORGANIZATION",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::SubscriptionInactive => "SUBSCRIPTION_INACTIVE",
            ErrorKind::ReadOnlyRestriction => "READ_ONLY_RESTRICTION",
            ErrorKind::InsufficientPermission => "INSUFFICIENT_PERMISSION",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// HTTP status code for this kind.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::MissingCredential | ErrorKind::InvalidCredential => 401,
            ErrorKind::NoOrganization
            | ErrorKind::SubscriptionInactive
            | ErrorKind::ReadOnlyRestriction
            | ErrorKind::InsufficientPermission => 403,
            ErrorKind::RateLimited => 429,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// Whether a client may retry the identical request later.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::RateLimited | ErrorKind::ServiceUnavailable)
    }

    /// Default human-readable message.
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::MissingCredential => {
                "Missing or invalid Authorization header. Expected: Bearer <token>"
            }
            ErrorKind::InvalidCredential => "Invalid or expired credential",
            ErrorKind::NoOrganization => "User is not associated with an organization",
            ErrorKind::RateLimited => "Rate limit exceeded",
            ErrorKind::SubscriptionInactive => "Organization subscription is inactive",
            ErrorKind::ReadOnlyRestriction => {
                "Organization is in read-only mode; only GET, HEAD and OPTIONS are allowed"
            }
            ErrorKind::InsufficientPermission => "Insufficient permissions",
            ErrorKind::ServiceUnavailable => "Authentication service unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, KeygateError>;

/// Startup, configuration and internal failures (never an authorization outcome).
#[derive(Debug, Error)]
pub enum KeygateError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl KeygateError {
    /// Stable code for logs and tests.
    pub fn client_code(&self) -> &'static str {
        match self {
            KeygateError::BadRequest(_) => "BAD_REQUEST",
            KeygateError::UnsupportedVersion => "UNSUPPORTED_VERSION",
            KeygateError::Internal(_) => "INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(ErrorKind::MissingCredential.http_status(), 401);
        assert_eq!(ErrorKind::InvalidCredential.http_status(), 401);
        assert_eq!(ErrorKind::NoOrganization.http_status(), 403);
        assert_eq!(ErrorKind::RateLimited.http_status(), 429);
        assert_eq!(ErrorKind::SubscriptionInactive.http_status(), 403);
        assert_eq!(ErrorKind::ReadOnlyRestriction.http_status(), 403);
        assert_eq!(ErrorKind::InsufficientPermission.http_status(), 403);
        assert_eq!(ErrorKind::ServiceUnavailable.http_status(), 503);
    }

    #[test]
    fn only_rate_limit_and_outage_are_retryable() {
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(ErrorKind::ServiceUnavailable.is_retryable());
        assert!(!ErrorKind::InvalidCredential.is_retryable());
    }
}
