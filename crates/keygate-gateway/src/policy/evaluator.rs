//! Access policy: billing state and permission checks for a resolved principal.
//!
//! Rules, first match wins:
//! 1. API key, organization suspended or canceled → `SubscriptionInactive`.
//!    API key, organization read-only, non-safe method → `ReadOnlyRestriction`.
//! 2. Required permission missing from an API key → `InsufficientPermission`.
//! 3. Allow.
//!
//! Session principals skip both rules: interactive end users are implicitly
//! authorized within their own organization.

use axum::http::Method;

use keygate_core::error::ErrorKind;
use keygate_core::principal::{AccessLevel, ApiKeyPrincipal, Principal, SubscriptionStatus};

/// Why a principal was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    SubscriptionInactive,
    ReadOnlyRestriction,
    InsufficientPermission,
}

impl From<DenyReason> for ErrorKind {
    fn from(r: DenyReason) -> Self {
        match r {
            DenyReason::SubscriptionInactive => ErrorKind::SubscriptionInactive,
            DenyReason::ReadOnlyRestriction => ErrorKind::ReadOnlyRestriction,
            DenyReason::InsufficientPermission => ErrorKind::InsufficientPermission,
        }
    }
}

/// Decision from policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny(DenyReason),
}

/// GET, HEAD and OPTIONS never mutate.
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub fn evaluate(
    principal: &Principal,
    required_permission: Option<&str>,
    method: &Method,
) -> PolicyDecision {
    match principal {
        Principal::ApiKey(key) => evaluate_api_key(key, required_permission, method),
        Principal::Session(_) => PolicyDecision::Allow,
    }
}

fn evaluate_api_key(
    key: &ApiKeyPrincipal,
    required_permission: Option<&str>,
    method: &Method,
) -> PolicyDecision {
    if key.access_level == AccessLevel::Suspended
        || key.subscription_status == SubscriptionStatus::Canceled
    {
        return PolicyDecision::Deny(DenyReason::SubscriptionInactive);
    }
    if key.access_level == AccessLevel::ReadOnly && !is_safe_method(method) {
        return PolicyDecision::Deny(DenyReason::ReadOnlyRestriction);
    }

    match required_permission {
        Some(perm) if !key.has_permission(perm) => {
            PolicyDecision::Deny(DenyReason::InsufficientPermission)
        }
        _ => PolicyDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_core::principal::SessionPrincipal;

    fn key(status: SubscriptionStatus, level: AccessLevel, perms: &[&str]) -> Principal {
        Principal::ApiKey(ApiKeyPrincipal {
            organization_id: "org_1".into(),
            key_id: "key_1".into(),
            created_by_user_id: "user_1".into(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
            subscription_status: status,
            access_level: level,
        })
    }

    const ALL: [&str; 4] = ["read:incidents", "write:incidents", "read:properties", "write:properties"];

    #[test]
    fn read_only_blocks_mutations_only() {
        let p = key(SubscriptionStatus::Active, AccessLevel::ReadOnly, &ALL);
        for m in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            assert_eq!(
                evaluate(&p, Some("write:incidents"), &m),
                PolicyDecision::Deny(DenyReason::ReadOnlyRestriction),
                "method={m}"
            );
        }
        for m in [Method::GET, Method::HEAD, Method::OPTIONS] {
            assert_eq!(evaluate(&p, Some("read:incidents"), &m), PolicyDecision::Allow, "method={m}");
        }
    }

    #[test]
    fn canceled_denies_every_method() {
        for level in [AccessLevel::Full, AccessLevel::ReadOnly] {
            let p = key(SubscriptionStatus::Canceled, level, &ALL);
            for m in [Method::GET, Method::HEAD, Method::OPTIONS, Method::POST, Method::DELETE] {
                assert_eq!(
                    evaluate(&p, Some("read:incidents"), &m),
                    PolicyDecision::Deny(DenyReason::SubscriptionInactive),
                    "method={m}"
                );
            }
        }
    }

    #[test]
    fn suspended_denies_even_without_required_permission() {
        let p = key(SubscriptionStatus::Active, AccessLevel::Suspended, &[]);
        assert_eq!(
            evaluate(&p, None, &Method::GET),
            PolicyDecision::Deny(DenyReason::SubscriptionInactive)
        );
    }

    #[test]
    fn billing_states_that_do_not_block() {
        for status in [SubscriptionStatus::Trialing, SubscriptionStatus::PastDue] {
            let p = key(status, AccessLevel::Full, &["write:incidents"]);
            assert_eq!(evaluate(&p, Some("write:incidents"), &Method::POST), PolicyDecision::Allow);
        }
    }

    #[test]
    fn missing_permission_is_denied() {
        let p = key(SubscriptionStatus::Active, AccessLevel::Full, &["read:*"]);
        assert_eq!(
            evaluate(&p, Some("read:incidents"), &Method::GET),
            PolicyDecision::Deny(DenyReason::InsufficientPermission)
        );
        assert_eq!(evaluate(&p, None, &Method::GET), PolicyDecision::Allow);
    }

    #[test]
    fn billing_check_precedes_permission_check() {
        let p = key(SubscriptionStatus::Active, AccessLevel::ReadOnly, &[]);
        assert_eq!(
            evaluate(&p, Some("write:incidents"), &Method::POST),
            PolicyDecision::Deny(DenyReason::ReadOnlyRestriction)
        );
    }

    #[test]
    fn session_is_exempt() {
        let p = Principal::Session(SessionPrincipal {
            user_id: "user_1".into(),
            organization_id: "org_1".into(),
        });
        assert_eq!(evaluate(&p, Some("write:incidents"), &Method::DELETE), PolicyDecision::Allow);
    }
}
