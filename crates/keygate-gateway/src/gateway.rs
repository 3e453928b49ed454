//! Gateway orchestrator: extract → resolve → rate-limit → policy → verdict.
//!
//! One `authorize` call per inbound request. The only shared mutable state is
//! the injected limiter; everything else lives for the span of the call.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, Method};

use keygate_core::error::ErrorKind;
use keygate_core::principal::Principal;
use keygate_core::protocol::credential::{Credential, SessionOrigin, SESSION_COOKIE};
use keygate_core::verdict::{Authorization, Denial, RateLimitStatus, Verdict};

use crate::clock::{Clock, SystemClock};
use crate::config::GatewayConfig;
use crate::identity::resolver::DEFAULT_STORE_TIMEOUT;
use crate::identity::{IdentityResolver, IdentityStore, ResolveError};
use crate::obs::metrics::GatewayMetrics;
use crate::policy::evaluator::{evaluate, DenyReason, PolicyDecision};
use crate::policy::limiter::{RateLimiter, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};
use crate::transport::credential::from_headers;

/// Tunables for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Requests per window for each API key.
    pub max_requests: u32,
    pub window: Duration,
    /// Bound on each identity-store call.
    pub store_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

impl GatewaySettings {
    pub fn from_config(cfg: &GatewayConfig) -> Self {
        Self {
            max_requests: cfg.rate_limit.max_requests,
            window: cfg.rate_limit.window(),
            store_timeout: cfg.gateway.identity_timeout(),
        }
    }
}

pub struct Gateway {
    resolver: IdentityResolver,
    limiter: Arc<dyn RateLimiter>,
    settings: GatewaySettings,
    clock: Arc<dyn Clock>,
    metrics: Arc<GatewayMetrics>,
}

impl Gateway {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        limiter: Arc<dyn RateLimiter>,
        settings: GatewaySettings,
    ) -> Self {
        let metrics = Arc::new(GatewayMetrics::default());
        Self {
            resolver: IdentityResolver::new(store, settings.store_timeout, Arc::clone(&metrics)),
            limiter,
            settings,
            clock: Arc::new(SystemClock),
            metrics,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Authorize one request from its method and headers.
    pub async fn authorize(
        &self,
        method: &Method,
        headers: &HeaderMap,
        required_permission: Option<&str>,
    ) -> Verdict {
        let credential = from_headers(headers);
        self.authorize_credential(credential, method, required_permission)
            .await
    }

    /// Authorize an already-extracted credential.
    pub async fn authorize_credential(
        &self,
        credential: Credential,
        method: &Method,
        required_permission: Option<&str>,
    ) -> Verdict {
        let scheme = credential.scheme();
        let verdict = match credential {
            Credential::None => Denial::new(ErrorKind::MissingCredential).into(),
            Credential::ApiKey { value } => {
                self.authorize_api_key(&value, method, required_permission)
                    .await
            }
            Credential::Session { value, origin } => {
                self.authorize_session(&value, origin, method, required_permission)
                    .await
            }
        };
        self.record(scheme, &verdict);
        verdict
    }

    async fn authorize_api_key(
        &self,
        raw_key: &str,
        method: &Method,
        required_permission: Option<&str>,
    ) -> Verdict {
        let key = match self.resolver.resolve_api_key(raw_key).await {
            Ok(k) => k,
            Err(e) => return resolve_denial(e, "Invalid or expired API key").into(),
        };

        // Counted before policy: calls later denied by policy still consume quota.
        let max = self.settings.max_requests;
        let decision = self
            .limiter
            .check(&key.key_id, max, self.settings.window, self.clock.now());
        if !decision.allowed {
            let retry_after = decision.retry_after_secs.unwrap_or(1);
            tracing::debug!(key_id = %key.key_id, retry_after, "api key rate limited");
            return Denial::rate_limited(max, retry_after).into();
        }
        let rate_limit = RateLimitStatus {
            limit: max,
            remaining: decision.remaining,
            retry_after_secs: None,
        };

        let principal = Principal::ApiKey(key);
        match evaluate(&principal, required_permission, method) {
            PolicyDecision::Allow => Verdict::Authorized(Authorization {
                principal,
                rate_limit: Some(rate_limit),
            }),
            PolicyDecision::Deny(reason) => {
                let mut denial = policy_denial(reason, required_permission);
                denial.rate_limit = Some(rate_limit);
                denial.into()
            }
        }
    }

    async fn authorize_session(
        &self,
        raw_token: &str,
        origin: SessionOrigin,
        method: &Method,
        required_permission: Option<&str>,
    ) -> Verdict {
        if origin == SessionOrigin::Header {
            self.metrics.legacy_session_header.inc(&[]);
            tracing::warn!(
                "session token sent in Authorization header is deprecated; use the {SESSION_COOKIE} cookie"
            );
        }

        let session = match self.resolver.resolve_session(raw_token).await {
            Ok(s) => s,
            Err(e) => return resolve_denial(e, "Invalid or expired session token").into(),
        };

        // Sessions are not rate limited.
        let principal = Principal::Session(session);
        match evaluate(&principal, required_permission, method) {
            PolicyDecision::Allow => Verdict::Authorized(Authorization {
                principal,
                rate_limit: None,
            }),
            PolicyDecision::Deny(reason) => policy_denial(reason, required_permission).into(),
        }
    }

    fn record(&self, scheme: &str, verdict: &Verdict) {
        match verdict {
            Verdict::Authorized(_) => {
                self.metrics.verdicts.inc(&[
                    ("outcome", "authorized"),
                    ("kind", "none"),
                    ("scheme", scheme),
                ]);
            }
            Verdict::Denied(d) => {
                tracing::debug!(kind = %d.kind, status = d.http_status(), scheme, "request denied");
                self.metrics.verdicts.inc(&[
                    ("outcome", "denied"),
                    ("kind", d.kind.as_str()),
                    ("scheme", scheme),
                ]);
            }
        }
    }
}

fn resolve_denial(err: ResolveError, not_found_message: &str) -> Denial {
    match err {
        ResolveError::NotFound => Denial::with_message(ErrorKind::InvalidCredential, not_found_message),
        ResolveError::NoOrganization => Denial::new(ErrorKind::NoOrganization),
        ResolveError::StoreUnavailable(_) => Denial::new(ErrorKind::ServiceUnavailable),
    }
}

fn policy_denial(reason: DenyReason, required_permission: Option<&str>) -> Denial {
    match (reason, required_permission) {
        (DenyReason::InsufficientPermission, Some(perm)) => Denial::with_message(
            ErrorKind::InsufficientPermission,
            format!("Insufficient permissions. Required: {perm}"),
        ),
        (reason, _) => Denial::new(reason.into()),
    }
}
