use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use common::{scan_chunk, ChunkRequest, ChunkResult};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::WorkerError;
use crate::heartbeat;
use crate::state::WorkerState;

pub fn build_router(state: WorkerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/process", post(process_chunk))
        .route("/heartbeat", get(trigger_heartbeat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

// Procesa un rango de bytes del log y devuelve sus métricas
async fn process_chunk(
    State(state): State<WorkerState>,
    Json(req): Json<ChunkRequest>,
) -> Result<Json<ChunkResult>, WorkerError> {
    if req.size == 0 {
        return Err(WorkerError::InvalidArgument(
            "size debe ser > 0".to_string(),
        ));
    }

    let ChunkRequest {
        filepath,
        start,
        size,
    } = req;
    info!(
        "worker {} procesando {} [{}, +{})",
        state.config.worker_id, filepath, start, size
    );

    // lectura de disco en un hilo de bloqueo
    let result = tokio::task::spawn_blocking(move || scan_chunk(&filepath, start, size))
        .await
        .map_err(|e| WorkerError::Internal(format!("join error: {e}")))??;

    info!(
        "chunk en offset {} listo: requests={} malformed={}",
        start, result.requests_per_second, result.malformed_lines
    );
    Ok(Json(result))
}

// Dispara un heartbeat hacia el coordinator; responde 200 pase lo que pase
async fn trigger_heartbeat(State(state): State<WorkerState>) -> &'static str {
    heartbeat::report_health(&state).await;
    "Health check passed."
}
