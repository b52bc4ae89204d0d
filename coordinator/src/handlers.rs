use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use common::{
    aggregate, plan_chunks, AggregateResult, AnalyzerSnapshot, MetricsDelta, PlanError,
    ProcessChunkRequest, WorkerHeartbeatRequest, WorkerInfo, WorkerRegisterRequest,
};
use std::{io, time::SystemTime};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::error::CoordinatorError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/register", post(register_worker))
        .route("/heartbeat", post(worker_heartbeat))
        .route("/process_chunk", post(process_chunk))
        .route("/workers", get(list_workers))
        .route("/metrics", get(get_metrics).post(push_metrics))
        .route("/metrics/reset", post(reset_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Registra (o re-registra) un worker
async fn register_worker(
    State(state): State<AppState>,
    Json(req): Json<WorkerRegisterRequest>,
) -> String {
    let is_new = state.registry.register(&req.worker_id, &req.worker_url);

    if is_new {
        info!("worker {} registrado en {}", req.worker_id, req.worker_url);
    } else {
        info!("worker {} re-registrado en {}", req.worker_id, req.worker_url);
    }
    format!("Worker {} registered.", req.worker_id)
}

// Heartbeat empujado por el worker; un id desconocido no hace nada
async fn worker_heartbeat(
    State(state): State<AppState>,
    Json(req): Json<WorkerHeartbeatRequest>,
) -> String {
    if state.registry.heartbeat(&req) {
        debug!("heartbeat ok de worker {}", req.worker_id);
    } else {
        debug!("heartbeat de worker desconocido {}, ignorado", req.worker_id);
    }
    format!("Health check received for worker {}.", req.worker_id)
}

async fn file_size(filepath: &str) -> Result<u64, CoordinatorError> {
    let meta = tokio::fs::metadata(filepath).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CoordinatorError::FileNotFound(filepath.to_string()),
        _ => CoordinatorError::Io(e),
    })?;

    if !meta.is_file() {
        return Err(CoordinatorError::InvalidArgument(format!(
            "{filepath} no es un archivo regular"
        )));
    }
    Ok(meta.len())
}

// Parte el archivo, reparte los chunks y agrega los resultados
async fn process_chunk(
    State(state): State<AppState>,
    Json(req): Json<ProcessChunkRequest>,
) -> Result<Json<AggregateResult>, CoordinatorError> {
    let request_id = uuid::Uuid::new_v4();

    if req.chunk_size <= 0 {
        return Err(PlanError::InvalidArgument(req.chunk_size).into());
    }

    // el snapshot queda fijo durante todo el pedido
    let workers = state.registry.snapshot();
    if workers.is_empty() {
        warn!("[{}] process_chunk sin workers disponibles", request_id);
        return Err(CoordinatorError::NoWorkersAvailable);
    }

    let size = file_size(&req.filepath).await?;
    let chunks = plan_chunks(size, req.chunk_size)?;

    info!(
        "[{}] {} ({} bytes) -> {} chunks de {} bytes sobre {} workers ({:?})",
        request_id,
        req.filepath,
        size,
        chunks.len(),
        req.chunk_size,
        workers.len(),
        state.dispatcher.mode(),
    );

    let results = match state
        .dispatcher
        .dispatch(&workers, &chunks, &req.filepath)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("[{}] pedido abortado: {}", request_id, e);
            return Err(e);
        }
    };

    let aggregated = aggregate(&results);
    info!(
        "[{}] listo: requests={} avg_ms={:.2} malformed={}",
        request_id,
        aggregated.requests_per_second,
        aggregated.avg_response_time,
        aggregated.malformed_lines
    );

    Ok(Json(aggregated))
}

async fn list_workers(State(state): State<AppState>) -> Json<Vec<WorkerInfo>> {
    Json(state.registry.list(SystemTime::now()))
}

/* ---------------- acumulador global ---------------- */

async fn push_metrics(
    State(state): State<AppState>,
    Json(delta): Json<MetricsDelta>,
) -> Json<AnalyzerSnapshot> {
    let mut analyzer = state.analyzer();
    analyzer.update(&delta);
    Json(analyzer.snapshot())
}

async fn get_metrics(State(state): State<AppState>) -> Json<AnalyzerSnapshot> {
    Json(state.analyzer().snapshot())
}

async fn reset_metrics(State(state): State<AppState>) -> Json<AnalyzerSnapshot> {
    let previous = state.analyzer().reset();
    info!("acumulador reiniciado tras {} updates", previous.updates);
    Json(previous)
}
