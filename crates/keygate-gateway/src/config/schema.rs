use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use keygate_core::error::{KeygateError, Result};
use keygate_core::principal::{AccessLevel, SubscriptionStatus};
use keygate_core::protocol::permission;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub rate_limit: RateLimitSection,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    #[serde(default)]
    pub identity: IdentitySection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(KeygateError::UnsupportedVersion);
        }
        if self.routes.is_empty() {
            return Err(KeygateError::BadRequest("routes must not be empty".into()));
        }

        self.gateway.validate()?;
        self.rate_limit.validate()?;

        let mut paths = HashSet::new();
        for r in &self.routes {
            r.validate()?;
            if !paths.insert(r.path.as_str()) {
                return Err(KeygateError::BadRequest(format!("duplicate route path: {}", r.path)));
            }
        }

        self.identity.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_identity_timeout_ms")]
    pub identity_timeout_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            identity_timeout_ms: default_identity_timeout_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(100..=60_000).contains(&self.identity_timeout_ms) {
            return Err(KeygateError::BadRequest(
                "gateway.identity_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            KeygateError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {}", self.listen))
        })
    }

    pub fn identity_timeout(&self) -> Duration {
        Duration::from_millis(self.identity_timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_identity_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSection {
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}

impl RateLimitSection {
    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(KeygateError::BadRequest("rate_limit.max_requests must be >= 1".into()));
        }
        if !(1_000..=86_400_000).contains(&self.window_ms) {
            return Err(KeygateError::BadRequest(
                "rate_limit.window_ms must be between 1000 and 86400000".into(),
            ));
        }
        if self.sweep_interval_ms < 1_000 {
            return Err(KeygateError::BadRequest(
                "rate_limit.sweep_interval_ms must be >= 1000".into(),
            ));
        }
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

fn default_max_requests() -> u32 {
    100
}
fn default_window_ms() -> u64 {
    60_000
}
fn default_sweep_interval_ms() -> u64 {
    5 * 60 * 1000
}

/// A gateway-guarded route.
///
/// With a `resource`, safe methods require `read:<resource>` and all others
/// `write:<resource>`; without one the route only requires authentication.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub path: String,
    #[serde(default)]
    pub resource: Option<String>,
}

/// Paths served by the ops endpoints; routes may not reuse them.
pub const RESERVED_PATHS: [&str; 2] = ["/healthz", "/metrics"];

impl RouteConfig {
    pub fn validate(&self) -> Result<()> {
        let Some(rest) = self.path.strip_prefix('/') else {
            return Err(KeygateError::BadRequest(format!(
                "route path must start with '/': {}",
                self.path
            )));
        };
        // Literal segments only: the router treats `:name` and `*name` as captures.
        if !rest.is_empty() && !rest.split('/').all(is_path_segment) {
            return Err(KeygateError::BadRequest(format!(
                "route path segments must be non-empty [A-Za-z0-9_.-]: {}",
                self.path
            )));
        }
        if RESERVED_PATHS.contains(&self.path.as_str()) {
            return Err(KeygateError::BadRequest(format!(
                "route path is reserved for ops endpoints: {}",
                self.path
            )));
        }
        if let Some(res) = &self.resource {
            if !permission::is_well_formed(&permission::permission_for(permission::READ, res)) {
                return Err(KeygateError::BadRequest(format!(
                    "invalid resource name on route {}: {res}",
                    self.path
                )));
            }
        }
        Ok(())
    }
}

fn is_path_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}

/// Seed data for the in-memory identity store.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentitySection {
    #[serde(default)]
    pub organizations: Vec<OrganizationSeed>,
    #[serde(default)]
    pub api_keys: Vec<ApiKeySeed>,
    #[serde(default)]
    pub sessions: Vec<SessionSeed>,
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

impl IdentitySection {
    pub fn validate(&self) -> Result<()> {
        let orgs: HashSet<&str> = self.organizations.iter().map(|o| o.id.as_str()).collect();
        if orgs.len() != self.organizations.len() {
            return Err(KeygateError::BadRequest("duplicate organization id".into()));
        }

        let mut key_ids = HashSet::new();
        let mut key_hashes = HashSet::new();
        for k in &self.api_keys {
            if !is_sha256_hex(&k.key_sha256) {
                return Err(KeygateError::BadRequest(format!(
                    "identity.api_keys[{}].key_sha256 must be 64 hex chars",
                    k.key_id
                )));
            }
            if !key_ids.insert(k.key_id.as_str()) {
                return Err(KeygateError::BadRequest(format!("duplicate api key id: {}", k.key_id)));
            }
            if !key_hashes.insert(k.key_sha256.to_ascii_lowercase()) {
                return Err(KeygateError::BadRequest(format!(
                    "api key {} reuses another key's hash",
                    k.key_id
                )));
            }
            if !orgs.contains(k.organization_id.as_str()) {
                return Err(KeygateError::BadRequest(format!(
                    "api key {} references unknown organization: {}",
                    k.key_id, k.organization_id
                )));
            }
            if let Some(bad) = k.permissions.iter().find(|p| !permission::is_well_formed(p)) {
                return Err(KeygateError::BadRequest(format!(
                    "api key {} has malformed permission: {bad} (expected verb:resource)",
                    k.key_id
                )));
            }
        }

        let mut tokens = HashSet::new();
        for s in &self.sessions {
            if !is_sha256_hex(&s.token_sha256) {
                return Err(KeygateError::BadRequest(format!(
                    "identity.sessions[{}].token_sha256 must be 64 hex chars",
                    s.user_id
                )));
            }
            // Digests compare case-insensitively; the store keys by lowercase hex.
            if !tokens.insert(s.token_sha256.to_ascii_lowercase()) {
                return Err(KeygateError::BadRequest(format!(
                    "duplicate session token hash for user {}",
                    s.user_id
                )));
            }
        }

        let mut user_ids = HashSet::new();
        for u in &self.users {
            if !user_ids.insert(u.id.as_str()) {
                return Err(KeygateError::BadRequest(format!("duplicate user id: {}", u.id)));
            }
        }
        Ok(())
    }
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationSeed {
    pub id: String,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    #[serde(default)]
    pub access_level: AccessLevel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiKeySeed {
    pub key_sha256: String,
    pub key_id: String,
    pub organization_id: String,
    pub created_by: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Unix epoch millis.
    #[serde(default)]
    pub expires_at_ms: Option<u64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSeed {
    pub token_sha256: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSeed {
    pub id: String,
    #[serde(default)]
    pub organization_id: Option<String>,
}
