//! Shared test fixtures: a scripted identity store and request helpers.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderValue};

use keygate_core::principal::{AccessLevel, SubscriptionStatus};
use keygate_gateway::identity::{ApiKeyRecord, IdentityStore, SessionRecord, StoreError, UserRecord};

pub const KEY_FULL: &str = "msd_live_0000000000000000000000000000full";
pub const KEY_READ_ONLY: &str = "msd_live_000000000000000000000000readonly";
pub const KEY_CANCELED: &str = "msd_live_000000000000000000000000canceled";
pub const SESSION_OK: &str = "sess_ok";
pub const SESSION_NO_ORG: &str = "sess_no_org";

/// Identity store with canned answers, a call counter and an outage switch.
#[derive(Default)]
pub struct MockStore {
    keys: HashMap<String, ApiKeyRecord>,
    sessions: HashMap<String, String>,
    users: HashMap<String, Option<String>>,
    pub calls: AtomicUsize,
    pub down: AtomicBool,
    pub user_lookup_down: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        let mut s = Self::default();
        s.add_key(KEY_FULL, "key_full", AccessLevel::Full, SubscriptionStatus::Active);
        s.add_key(
            KEY_READ_ONLY,
            "key_ro",
            AccessLevel::ReadOnly,
            SubscriptionStatus::PastDue,
        );
        s.add_key(
            KEY_CANCELED,
            "key_canceled",
            AccessLevel::Full,
            SubscriptionStatus::Canceled,
        );
        s.sessions.insert(SESSION_OK.into(), "user_ok".into());
        s.sessions.insert(SESSION_NO_ORG.into(), "user_orphan".into());
        s.users.insert("user_ok".into(), Some("org_1".into()));
        s.users.insert("user_orphan".into(), None);
        s
    }

    pub fn add_key(
        &mut self,
        raw: &str,
        key_id: &str,
        access_level: AccessLevel,
        subscription_status: SubscriptionStatus,
    ) {
        self.keys.insert(
            raw.into(),
            ApiKeyRecord {
                organization_id: "org_1".into(),
                key_id: key_id.into(),
                created_by: "user_admin".into(),
                permissions: vec!["read:incidents".into(), "write:incidents".into()],
                subscription_status: Some(subscription_status),
                access_level: Some(access_level),
            },
        );
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Fail only `get_user`, after session validation has succeeded.
    pub fn set_user_lookup_down(&self, down: bool) {
        self.user_lookup_down.store(down, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MockStore {
    async fn validate_api_key(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        self.enter()?;
        Ok(self.keys.get(raw_key).cloned())
    }

    async fn validate_session(&self, raw_token: &str) -> Result<Option<SessionRecord>, StoreError> {
        self.enter()?;
        Ok(self.sessions.get(raw_token).map(|u| SessionRecord { user_id: u.clone() }))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.enter()?;
        if self.user_lookup_down.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout);
        }
        Ok(self.users.get(user_id).map(|org| UserRecord {
            organization_id: org.clone(),
        }))
    }
}

pub fn bearer(token: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    h
}

pub fn session_cookie(token: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!("sda_session={token}")).unwrap(),
    );
    h
}
