use anyhow::Result;
use coordinator::{build_router, monitor, AppState, CoordinatorConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=debug,tower_http=info")),
        )
        .init();

    let config = CoordinatorConfig::from_env();
    let state = AppState::new(&config);

    // router HTTP
    let app = build_router(state.clone());

    // monitor de heartbeats en segundo plano
    match config.liveness {
        Some(policy) => {
            let registry = state.registry.clone();
            tokio::spawn(async move {
                monitor::monitor_workers(registry, policy).await;
            });
        }
        None => info!("degradación de workers desactivada"),
    }

    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!(
        "coordinator escuchando en {} (dispatch {:?})",
        listener.local_addr()?,
        config.dispatch_mode
    );

    axum::serve(listener, app).await?;
    Ok(())
}
