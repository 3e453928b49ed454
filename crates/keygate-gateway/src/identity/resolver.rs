//! Credential → principal resolution against the identity store.
//!
//! Every store failure is caught here and becomes `StoreUnavailable`; a raw
//! transport error never reaches the gateway's caller. `NotFound` (401) and
//! `StoreUnavailable` (503) stay distinct so outages alert differently from bad
//! credentials.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use keygate_core::principal::{ApiKeyPrincipal, SessionPrincipal};
use keygate_core::protocol::credential::API_KEY_PREFIX;

use super::store::{IdentityStore, StoreError};
use crate::obs::metrics::GatewayMetrics;

/// Default bound on a single identity-store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("credential not found")]
    NotFound,
    #[error("user has no organization")]
    NoOrganization,
    #[error("identity store unavailable: {0}")]
    StoreUnavailable(String),
}

pub struct IdentityResolver {
    store: Arc<dyn IdentityStore>,
    timeout: Duration,
    metrics: Arc<GatewayMetrics>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn IdentityStore>, timeout: Duration, metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            store,
            timeout,
            metrics,
        }
    }

    /// Resolve an API key. Keys without the `msd_live_` prefix are rejected
    /// without contacting the store.
    pub async fn resolve_api_key(&self, raw_key: &str) -> Result<ApiKeyPrincipal, ResolveError> {
        if !raw_key.starts_with(API_KEY_PREFIX) {
            return Err(ResolveError::NotFound);
        }

        let record = self
            .call("validate_api_key", self.store.validate_api_key(raw_key))
            .await?
            .ok_or(ResolveError::NotFound)?;

        if record.organization_id.is_empty() {
            tracing::warn!(key_id = %record.key_id, "api key has no organization");
            return Err(ResolveError::NoOrganization);
        }

        Ok(ApiKeyPrincipal {
            organization_id: record.organization_id,
            key_id: record.key_id,
            created_by_user_id: record.created_by,
            permissions: record.permissions,
            subscription_status: record.subscription_status.unwrap_or_default(),
            access_level: record.access_level.unwrap_or_default(),
        })
    }

    /// Resolve a session token, then its owning user's organization.
    pub async fn resolve_session(&self, raw_token: &str) -> Result<SessionPrincipal, ResolveError> {
        let session = self
            .call("validate_session", self.store.validate_session(raw_token))
            .await?
            .ok_or(ResolveError::NotFound)?;

        let user = self
            .call("get_user", self.store.get_user(&session.user_id))
            .await?
            .ok_or(ResolveError::NotFound)?;

        match user.organization_id {
            Some(org) if !org.is_empty() => Ok(SessionPrincipal {
                user_id: session.user_id,
                organization_id: org,
            }),
            _ => Err(ResolveError::NoOrganization),
        }
    }

    async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T, ResolveError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let started = Instant::now();
        let res = match tokio::time::timeout(self.timeout, fut).await {
            Ok(r) => r,
            Err(_) => Err(StoreError::Timeout),
        };
        let outcome = if res.is_ok() { "ok" } else { "error" };
        self.metrics
            .store_call_duration
            .observe(&[("op", op), ("outcome", outcome)], started.elapsed());

        res.map_err(|e| {
            tracing::error!(op, error = %e, "identity store call failed");
            ResolveError::StoreUnavailable(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::store::{ApiKeyRecord, SessionRecord, UserRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Scripted {
        calls: AtomicUsize,
        fail: bool,
        hang: bool,
        user_org: Option<Option<String>>,
    }

    #[async_trait]
    impl IdentityStore for Scripted {
        async fn validate_api_key(&self, _raw: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            Ok(Some(ApiKeyRecord {
                organization_id: "org_1".into(),
                key_id: "key_1".into(),
                created_by: "user_1".into(),
                permissions: vec!["read:incidents".into()],
                subscription_status: None,
                access_level: None,
            }))
        }

        async fn validate_session(&self, _raw: &str) -> Result<Option<SessionRecord>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(SessionRecord {
                user_id: "user_1".into(),
            }))
        }

        async fn get_user(&self, _user_id: &str) -> Result<Option<UserRecord>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .user_org
                .clone()
                .map(|organization_id| UserRecord { organization_id }))
        }
    }

    fn resolver(store: Arc<Scripted>, timeout: Duration) -> IdentityResolver {
        IdentityResolver::new(store, timeout, Arc::new(GatewayMetrics::default()))
    }

    #[tokio::test]
    async fn bad_prefix_never_reaches_store() {
        let store = Arc::new(Scripted::default());
        let r = resolver(store.clone(), DEFAULT_STORE_TIMEOUT);
        assert_eq!(r.resolve_api_key("sk_live_abc").await, Err(ResolveError::NotFound));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_billing_defaults_to_active_full() {
        let store = Arc::new(Scripted::default());
        let p = resolver(store, DEFAULT_STORE_TIMEOUT)
            .resolve_api_key("msd_live_abc")
            .await
            .unwrap();
        assert_eq!(p.subscription_status, Default::default());
        assert_eq!(p.access_level, Default::default());
        assert_eq!(p.created_by_user_id, "user_1");
    }

    #[tokio::test]
    async fn store_error_is_unavailable_not_found() {
        let store = Arc::new(Scripted {
            fail: true,
            ..Default::default()
        });
        let err = resolver(store, DEFAULT_STORE_TIMEOUT)
            .resolve_api_key("msd_live_abc")
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::StoreUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_unavailable() {
        let store = Arc::new(Scripted {
            hang: true,
            ..Default::default()
        });
        let metrics = Arc::new(GatewayMetrics::default());
        let r = IdentityResolver::new(store, Duration::from_millis(50), Arc::clone(&metrics));
        let err = r.resolve_api_key("msd_live_abc").await.unwrap_err();
        assert!(matches!(err, ResolveError::StoreUnavailable(_)));

        let timed_out = [("op", "validate_api_key"), ("outcome", "error")];
        assert_eq!(metrics.store_call_duration.count(&timed_out), 1);
        assert_eq!(
            metrics
                .store_call_duration
                .count(&[("op", "validate_api_key"), ("outcome", "ok")]),
            0
        );
    }

    #[tokio::test]
    async fn session_user_states() {
        let no_org = Arc::new(Scripted {
            user_org: Some(None),
            ..Default::default()
        });
        assert_eq!(
            resolver(no_org, DEFAULT_STORE_TIMEOUT).resolve_session("tok").await,
            Err(ResolveError::NoOrganization)
        );

        let no_user = Arc::new(Scripted::default());
        assert_eq!(
            resolver(no_user, DEFAULT_STORE_TIMEOUT).resolve_session("tok").await,
            Err(ResolveError::NotFound)
        );

        let ok = Arc::new(Scripted {
            user_org: Some(Some("org_9".into())),
            ..Default::default()
        });
        let p = resolver(ok.clone(), DEFAULT_STORE_TIMEOUT)
            .resolve_session("tok")
            .await
            .unwrap();
        assert_eq!(p.organization_id, "org_9");
        assert_eq!(ok.calls.load(Ordering::SeqCst), 2);
    }
}
