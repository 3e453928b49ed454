//! In-memory identity store seeded from config.
//!
//! Secrets are held only as SHA-256 hex digests and looked up by digest.
//! Inactive or expired keys validate as absent. A key whose organization has
//! no record reports `active`/`full`.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use keygate_core::principal::{AccessLevel, SubscriptionStatus};

use super::store::{ApiKeyRecord, IdentityStore, SessionRecord, StoreError, UserRecord};
use crate::config::schema::{ApiKeySeed, IdentitySection, OrganizationSeed};

/// Lowercase hex SHA-256 of a raw key or token.
pub fn hash_secret(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[derive(Debug, Clone)]
struct StoredKey {
    key_id: String,
    organization_id: String,
    created_by: String,
    permissions: Vec<String>,
    active: bool,
    expires_at_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct Billing {
    subscription_status: SubscriptionStatus,
    access_level: AccessLevel,
}

#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    keys: HashMap<String, StoredKey>,
    organizations: HashMap<String, Billing>,
    sessions: HashMap<String, String>,
    users: HashMap<String, Option<String>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &IdentitySection) -> Self {
        let mut store = Self::new();
        for org in &cfg.organizations {
            store.insert_organization(org);
        }
        for key in &cfg.api_keys {
            store.insert_api_key_hash(key);
        }
        for s in &cfg.sessions {
            store
                .sessions
                .insert(s.token_sha256.to_ascii_lowercase(), s.user_id.clone());
        }
        for u in &cfg.users {
            store.users.insert(u.id.clone(), u.organization_id.clone());
        }
        store
    }

    pub fn insert_organization(&mut self, org: &OrganizationSeed) {
        self.organizations.insert(
            org.id.clone(),
            Billing {
                subscription_status: org.subscription_status,
                access_level: org.access_level,
            },
        );
    }

    /// Register a key by its plaintext (hashed before storage).
    pub fn insert_api_key(&mut self, raw_key: &str, seed: &ApiKeySeed) {
        let mut seed = seed.clone();
        seed.key_sha256 = hash_secret(raw_key);
        self.insert_api_key_hash(&seed);
    }

    fn insert_api_key_hash(&mut self, seed: &ApiKeySeed) {
        self.keys.insert(
            seed.key_sha256.to_ascii_lowercase(),
            StoredKey {
                key_id: seed.key_id.clone(),
                organization_id: seed.organization_id.clone(),
                created_by: seed.created_by.clone(),
                permissions: seed.permissions.clone(),
                active: seed.active,
                expires_at_ms: seed.expires_at_ms,
            },
        );
    }

    /// Register a session by its plaintext token.
    pub fn insert_session(&mut self, raw_token: &str, user_id: impl Into<String>) {
        self.sessions.insert(hash_secret(raw_token), user_id.into());
    }

    pub fn insert_user(&mut self, user_id: impl Into<String>, organization_id: Option<String>) {
        self.users.insert(user_id.into(), organization_id);
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn validate_api_key(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        let Some(key) = self.keys.get(&hash_secret(raw_key)) else {
            return Ok(None);
        };
        if !key.active {
            return Ok(None);
        }
        if key.expires_at_ms.is_some_and(|exp| exp < now_ms()) {
            return Ok(None);
        }

        let billing = self.organizations.get(&key.organization_id);
        Ok(Some(ApiKeyRecord {
            organization_id: key.organization_id.clone(),
            key_id: key.key_id.clone(),
            created_by: key.created_by.clone(),
            permissions: key.permissions.clone(),
            subscription_status: Some(billing.map(|b| b.subscription_status).unwrap_or_default()),
            access_level: Some(billing.map(|b| b.access_level).unwrap_or_default()),
        }))
    }

    async fn validate_session(&self, raw_token: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self
            .sessions
            .get(&hash_secret(raw_token))
            .map(|user_id| SessionRecord {
                user_id: user_id.clone(),
            }))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(user_id).map(|org| UserRecord {
            organization_id: org.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(key_id: &str) -> ApiKeySeed {
        ApiKeySeed {
            key_sha256: String::new(),
            key_id: key_id.into(),
            organization_id: "org_1".into(),
            created_by: "user_1".into(),
            permissions: vec!["read:incidents".into()],
            active: true,
            expires_at_ms: None,
        }
    }

    #[test]
    fn hash_is_lowercase_sha256_hex() {
        let h = hash_secret("abc");
        assert_eq!(h, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[tokio::test]
    async fn unknown_org_defaults_to_active_full() {
        let mut store = InMemoryIdentityStore::new();
        store.insert_api_key("msd_live_a", &seed("key_a"));
        let rec = store.validate_api_key("msd_live_a").await.unwrap().unwrap();
        assert_eq!(rec.subscription_status, Some(SubscriptionStatus::Active));
        assert_eq!(rec.access_level, Some(AccessLevel::Full));
    }

    #[tokio::test]
    async fn org_billing_is_reported() {
        let mut store = InMemoryIdentityStore::new();
        store.insert_organization(&OrganizationSeed {
            id: "org_1".into(),
            subscription_status: SubscriptionStatus::PastDue,
            access_level: AccessLevel::ReadOnly,
        });
        store.insert_api_key("msd_live_a", &seed("key_a"));
        let rec = store.validate_api_key("msd_live_a").await.unwrap().unwrap();
        assert_eq!(rec.subscription_status, Some(SubscriptionStatus::PastDue));
        assert_eq!(rec.access_level, Some(AccessLevel::ReadOnly));
    }

    #[tokio::test]
    async fn inactive_and_expired_keys_are_absent() {
        let mut store = InMemoryIdentityStore::new();
        let mut inactive = seed("key_i");
        inactive.active = false;
        store.insert_api_key("msd_live_inactive", &inactive);
        let mut expired = seed("key_e");
        expired.expires_at_ms = Some(1);
        store.insert_api_key("msd_live_expired", &expired);

        assert!(store.validate_api_key("msd_live_inactive").await.unwrap().is_none());
        assert!(store.validate_api_key("msd_live_expired").await.unwrap().is_none());
        assert!(store.validate_api_key("msd_live_unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_and_users() {
        let mut store = InMemoryIdentityStore::new();
        store.insert_session("tok", "user_1");
        store.insert_user("user_1", Some("org_1".into()));

        let s = store.validate_session("tok").await.unwrap().unwrap();
        assert_eq!(s.user_id, "user_1");
        let u = store.get_user("user_1").await.unwrap().unwrap();
        assert_eq!(u.organization_id.as_deref(), Some("org_1"));
        assert!(store.validate_session("other").await.unwrap().is_none());
    }
}
