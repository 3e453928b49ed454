//! Operational HTTP endpoints (not gateway-guarded).
//!
//! - `/healthz` : liveness
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let limiter = state.limiter();
    let extra = [
        ("keygate_rate_limit_entries", limiter.len() as u64),
        ("keygate_rate_limit_evicted_total", limiter.evicted_total()),
    ];
    let body = state.gateway().metrics().render(&extra);

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
