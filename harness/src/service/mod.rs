//! @ai:module:intent HTTP endpoint grader and calculator tool service
//! @ai:module:layer presentation
//! @ai:module:public_api create_router, serve, AppState, ApiError

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::create_router;
pub use state::AppState;

use crate::config::HarnessConfig;
use anyhow::{Context, Result};
use tokio::net::TcpListener;

/// @ai:intent Run the grader service until ctrl-c
/// @ai:effects network, state:write
pub async fn serve(config: &HarnessConfig) -> Result<()> {
    let state = AppState::with_trace_ttl(config.trace.ttl());
    let app = create_router(state.clone());

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Endpoint grader listening on {}", addr);
    tracing::info!("Trace TTL: {}s", config.trace.ttl_secs);

    let traces = state.traces.clone();
    let sweep_every = config.trace.ttl().max(std::time::Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = traces.purge_expired().await;
            if removed > 0 {
                tracing::debug!("Purged {} expired traces", removed);
            }
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Endpoint grader shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
    }
}
