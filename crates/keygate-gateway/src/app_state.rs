//! Shared application state for the keygate gateway.
//!
//! Wires the identity store, limiter and orchestrator once at startup; all
//! handlers share them through cheap `Arc` clones.

use std::sync::Arc;

use keygate_core::error::Result;

use crate::config::GatewayConfig;
use crate::gateway::{Gateway, GatewaySettings};
use crate::identity::{IdentityStore, InMemoryIdentityStore};
use crate::policy::limiter::FixedWindowLimiter;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    gateway: Arc<Gateway>,
    limiter: Arc<FixedWindowLimiter>,
}

struct AppStateInner {
    cfg: GatewayConfig,
}

impl AppState {
    /// Build state backed by the in-memory identity store seeded from config.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let store = InMemoryIdentityStore::from_config(&cfg.identity);
        tracing::info!(
            api_keys = store.key_count(),
            sessions = store.session_count(),
            "identity store loaded"
        );
        Self::with_store(cfg, Arc::new(store))
    }

    /// Build state around an externally constructed identity store.
    pub fn with_store(cfg: GatewayConfig, store: Arc<dyn IdentityStore>) -> Result<Self> {
        cfg.validate()?;

        let settings = GatewaySettings::from_config(&cfg);
        let limiter = Arc::new(FixedWindowLimiter::new(cfg.rate_limit.sweep_interval()));
        let gateway = Gateway::new(store, limiter.clone(), settings);

        tracing::info!(
            max_requests = settings.max_requests,
            window_ms = settings.window.as_millis() as u64,
            "rate limiter configured"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            gateway: Arc::new(gateway),
            limiter,
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn gateway(&self) -> Arc<Gateway> {
        Arc::clone(&self.gateway)
    }

    pub fn limiter(&self) -> Arc<FixedWindowLimiter> {
        Arc::clone(&self.limiter)
    }
}
