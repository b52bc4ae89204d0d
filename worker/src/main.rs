use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use worker::{build_router, heartbeat, WorkerConfig, WorkerState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("worker=debug,reqwest=info")),
        )
        .init();

    let config = WorkerConfig::from_env();
    let interval = config.heartbeat_interval;
    let state = WorkerState::new(config);

    // primero escuchar, después anunciarse al coordinator
    let listener = TcpListener::bind(state.config.listen_addr()).await?;
    info!(
        "worker {} escuchando en {} (coordinator {})",
        state.config.worker_id,
        listener.local_addr()?,
        state.config.coordinator_url
    );

    let hb_state = state.clone();
    tokio::spawn(async move {
        heartbeat::run(hb_state, interval).await;
    });

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
