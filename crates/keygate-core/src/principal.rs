//! Resolved caller identity.
//!
//! Two credential schemes serve different caller populations: machine API
//! clients (API keys, scoped permissions, subject to billing state) and
//! interactive end users (sessions, implicitly full access within their own
//! organization). Both always carry an organization id.

use serde::{Deserialize, Serialize};

/// Organization subscription status as reported by the identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trialing,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }
}

/// Organization-wide, billing-derived access restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Full,
    ReadOnly,
    Suspended,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Full => "full",
            AccessLevel::ReadOnly => "read_only",
            AccessLevel::Suspended => "suspended",
        }
    }
}

/// Principal authenticated by an API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiKeyPrincipal {
    pub organization_id: String,
    pub key_id: String,
    pub created_by_user_id: String,
    /// `verb:resource` strings, matched exactly.
    pub permissions: Vec<String>,
    pub subscription_status: SubscriptionStatus,
    pub access_level: AccessLevel,
}

impl ApiKeyPrincipal {
    /// Exact set-membership check (no wildcard expansion).
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Principal authenticated by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionPrincipal {
    pub user_id: String,
    pub organization_id: String,
}

/// The trusted identity for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum Principal {
    ApiKey(ApiKeyPrincipal),
    Session(SessionPrincipal),
}

impl Principal {
    /// Tenant isolation boundary.
    pub fn organization_id(&self) -> &str {
        match self {
            Principal::ApiKey(p) => &p.organization_id,
            Principal::Session(p) => &p.organization_id,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Principal::ApiKey(_) => "api_key",
            Principal::Session(_) => "session",
        }
    }

    /// Permission check for handlers that branch after a successful authorize.
    ///
    /// Session principals hold implicit full access to their own organization,
    /// so this is always true for them.
    pub fn has_permission(&self, permission: &str) -> bool {
        match self {
            Principal::ApiKey(p) => p.has_permission(permission),
            Principal::Session(_) => true,
        }
    }

    pub fn as_api_key(&self) -> Option<&ApiKeyPrincipal> {
        match self {
            Principal::ApiKey(p) => Some(p),
            Principal::Session(_) => None,
        }
    }

    pub fn as_session(&self) -> Option<&SessionPrincipal> {
        match self {
            Principal::Session(p) => Some(p),
            Principal::ApiKey(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(perms: &[&str]) -> ApiKeyPrincipal {
        ApiKeyPrincipal {
            organization_id: "org_1".into(),
            key_id: "key_1".into(),
            created_by_user_id: "user_1".into(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
            subscription_status: SubscriptionStatus::Active,
            access_level: AccessLevel::Full,
        }
    }

    #[test]
    fn permission_is_exact_match() {
        let p = key(&["read:incidents"]);
        assert!(p.has_permission("read:incidents"));
        assert!(!p.has_permission("write:incidents"));
        assert!(!p.has_permission("read:incident"));
    }

    #[test]
    fn wildcard_is_not_expanded() {
        let p = Principal::ApiKey(key(&["read:*"]));
        assert!(!p.has_permission("read:incidents"));
        assert!(p.has_permission("read:*"));
    }

    #[test]
    fn session_principal_is_implicitly_allowed() {
        let p = Principal::Session(SessionPrincipal {
            user_id: "user_1".into(),
            organization_id: "org_1".into(),
        });
        assert!(p.has_permission("write:incidents"));
        assert_eq!(p.organization_id(), "org_1");
    }

    #[test]
    fn billing_states_parse_snake_case() {
        let s: SubscriptionStatus = serde_json::from_str("\"past_due\"").unwrap();
        assert_eq!(s, SubscriptionStatus::PastDue);
        let a: AccessLevel = serde_json::from_str("\"read_only\"").unwrap();
        assert_eq!(a, AccessLevel::ReadOnly);
    }
}
