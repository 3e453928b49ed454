//! keygate gateway library entry.
//!
//! This crate wires credential extraction, identity resolution, rate limiting
//! and access policy into a single `Gateway::authorize` call, and exposes it to
//! HTTP handlers through an axum guard middleware. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod clock;
pub mod config;
pub mod gateway;
pub mod identity;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod transport;

pub use gateway::{Gateway, GatewaySettings};
