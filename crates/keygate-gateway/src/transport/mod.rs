//! Transport layer (HTTP).
//!
//! Adapts axum requests to the gateway: credential extraction from headers,
//! the per-route guard middleware, denial responses and the CORS policy.

pub mod cors;
pub mod credential;
pub mod guard;
pub mod response;
