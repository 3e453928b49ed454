//! Route guard middleware.
//!
//! Runs `Gateway::authorize` before the route handler. On success the
//! `Principal` is placed in request extensions (use `Extension<Principal>`);
//! on failure the handler never runs.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use keygate_core::protocol::permission::{permission_for, READ, WRITE};
use keygate_core::verdict::Verdict;

use super::response::{insert_rate_limit_headers, Rejection};
use crate::gateway::Gateway;
use crate::policy::evaluator::is_safe_method;

/// Per-route guard state.
#[derive(Clone)]
pub struct RouteGuard {
    gateway: Arc<Gateway>,
    resource: Option<Arc<str>>,
}

impl RouteGuard {
    pub fn new(gateway: Arc<Gateway>, resource: Option<&str>) -> Self {
        Self {
            gateway,
            resource: resource.map(Arc::from),
        }
    }

    /// `read:<resource>` for safe methods, `write:<resource>` otherwise.
    pub fn required_permission(&self, method: &Method) -> Option<String> {
        let resource = self.resource.as_deref()?;
        let verb = if is_safe_method(method) { READ } else { WRITE };
        Some(permission_for(verb, resource))
    }
}

pub async fn guard(State(guard): State<RouteGuard>, req: Request, next: Next) -> Response {
    // Split so the non-Sync body isn't borrowed across the await.
    let (mut parts, body) = req.into_parts();
    let required = guard.required_permission(&parts.method);

    let verdict = guard
        .gateway
        .authorize(&parts.method, &parts.headers, required.as_deref())
        .await;

    match verdict {
        Verdict::Denied(denial) => Rejection(denial).into_response(),
        Verdict::Authorized(auth) => {
            parts.extensions.insert(auth.principal);
            let mut resp = next.run(Request::from_parts(parts, body)).await;
            if let Some(rl) = &auth.rate_limit {
                insert_rate_limit_headers(resp.headers_mut(), rl);
            }
            resp
        }
    }
}
