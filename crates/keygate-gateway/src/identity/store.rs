//! Identity-store contract (queried, never mutated, by the gateway).

use async_trait::async_trait;
use thiserror::Error;

use keygate_core::principal::{AccessLevel, SubscriptionStatus};

/// Transport or backend failure while talking to the identity store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
    #[error("identity store timed out")]
    Timeout,
}

/// A valid API key as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyRecord {
    pub organization_id: String,
    pub key_id: String,
    pub created_by: String,
    pub permissions: Vec<String>,
    /// `None` when the organization carries no billing record.
    pub subscription_status: Option<SubscriptionStatus>,
    pub access_level: Option<AccessLevel>,
}

/// A valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub organization_id: Option<String>,
}

/// External tenant/identity store.
///
/// `Ok(None)` means "not valid / not found"; `Err` is reserved for the store
/// itself failing.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn validate_api_key(&self, raw_key: &str) -> Result<Option<ApiKeyRecord>, StoreError>;

    async fn validate_session(&self, raw_token: &str) -> Result<Option<SessionRecord>, StoreError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;
}
