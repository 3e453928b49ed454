//! Policy layer (access policy evaluation + request rate limiting).
//!
//! Both components are pure with respect to I/O: the evaluator is a function
//! of the principal and request, the limiter owns only in-process counters.

pub mod evaluator;
pub mod limiter;

pub use evaluator::{evaluate, DenyReason, PolicyDecision};
pub use limiter::{FixedWindowLimiter, RateLimitDecision, RateLimiter};
