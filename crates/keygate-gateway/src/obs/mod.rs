//! Lightweight in-process metrics.
//!
//! Verdict counters and identity-store latency are stored as atomics and
//! rendered by the `/metrics` handler.

pub mod metrics;
