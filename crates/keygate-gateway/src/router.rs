//! Axum router wiring.
//!
//! Every configured route sits behind the gateway guard; ops endpoints do not.
//! The CORS layer wraps everything so preflights never reach the guard.

use axum::{
    http::Method,
    middleware,
    routing::{any, get},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use keygate_core::principal::Principal;

use crate::app_state::AppState;
use crate::transport::cors::cors_layer;
use crate::transport::guard::{guard, RouteGuard};
use crate::ops;

pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new();

    for route in &state.cfg().routes {
        let route_guard = RouteGuard::new(state.gateway(), route.resource.as_deref());
        let guarded = Router::new()
            .route(&route.path, any(principal_context))
            .route_layer(middleware::from_fn_with_state(route_guard, guard));
        app = app.merge(guarded);
    }

    let ops_routes = Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .with_state(state);

    app.merge(ops_routes).layer(cors_layer())
}

/// Downstream stand-in: echoes the authorized principal's tenant context.
async fn principal_context(method: Method, Extension(principal): Extension<Principal>) -> Json<Value> {
    Json(json!({
        "data": principal,
        "meta": {
            "organization_id": principal.organization_id(),
            "method": method.as_str(),
        }
    }))
}
