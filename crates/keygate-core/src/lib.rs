//! keygate core: transport-agnostic credential protocol, principal model,
//! verdict types and the deny taxonomy.
//!
//! This crate defines the contracts shared by the gateway runtime, its HTTP
//! transport and any downstream handler that consumes a verdict. It carries no
//! transport or runtime dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `KeygateError`/`Result` or as an
//! explicit deny kind.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod principal;
pub mod protocol;
pub mod verdict;

/// Shared result type.
pub use error::{ErrorKind, KeygateError, Result};
pub use principal::{AccessLevel, ApiKeyPrincipal, Principal, SessionPrincipal, SubscriptionStatus};
pub use protocol::credential::{Credential, SessionOrigin};
pub use verdict::{Authorization, Denial, RateLimitStatus, Verdict};
