//! keygate gateway binary.
//!
//! - Strict YAML config from `KEYGATE_CONFIG` (default `keygate.yaml`)
//! - In-memory identity store seeded from the config
//! - Guarded routes + `/healthz` + `/metrics`

use tracing_subscriber::{fmt, EnvFilter};

use keygate_core::error::Result;
use keygate_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.client_code(), "keygate-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.gateway.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "keygate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.map_err(|e| {
        keygate_core::KeygateError::Internal(format!("failed to bind {listen}: {e}"))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| keygate_core::KeygateError::Internal(format!("server failed: {e}")))
}
