//! Protocol modules (credential transport + permission strings).
//!
//! This module hosts the request-side wire conventions:
//! - Credentials: `Authorization: Bearer <token>` header or `sda_session` cookie.
//! - Permissions: `verb:resource` strings attached to API keys.
//!
//! All parsers are panic-free: malformed input never errors, it simply fails
//! to produce a credential, keeping the gateway resilient to hostile traffic.

pub mod credential;
pub mod permission;
