use anyhow::Result;
use common::{WorkerHeartbeatRequest, WorkerRegisterRequest};
use std::time::Duration;
use sysinfo::{CpuExt, SystemExt};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::state::WorkerState;

/// Se anuncia al coordinator con su id y URL.
pub async fn register_with_coordinator(state: &WorkerState) -> Result<()> {
    let register_url = state.config.coordinator_endpoint("/register");
    state
        .client
        .post(&register_url)
        .json(&WorkerRegisterRequest {
            worker_id: state.config.worker_id.clone(),
            worker_url: state.config.worker_url.clone(),
        })
        .send()
        .await?
        .error_for_status()?;

    info!(
        "worker {} registrado contra {} como {}",
        state.config.worker_id, state.config.coordinator_url, state.config.worker_url
    );
    Ok(())
}

/// CPU y memoria del host para adjuntar al heartbeat
fn sample_host(state: &WorkerState) -> (f32, u64) {
    let mut sys = state.system();
    sys.refresh_cpu();
    sys.refresh_memory();
    (sys.global_cpu_info().cpu_usage(), sys.used_memory())
}

/// Empuja un heartbeat al coordinator. Los fallos sólo se loguean.
pub async fn report_health(state: &WorkerState) -> bool {
    let (cpu_percent, mem_bytes) = sample_host(state);
    let hb_url = state.config.coordinator_endpoint("/heartbeat");

    let sent = state
        .client
        .post(&hb_url)
        .json(&WorkerHeartbeatRequest {
            worker_id: state.config.worker_id.clone(),
            cpu_percent: Some(cpu_percent),
            mem_bytes: Some(mem_bytes),
        })
        .send()
        .await
        .and_then(|resp| resp.error_for_status());

    match sent {
        Ok(_) => {
            debug!("heartbeat enviado (cpu={:.1}%)", cpu_percent);
            true
        }
        Err(e) => {
            warn!("health check falló para worker {}: {}", state.config.worker_id, e);
            false
        }
    }
}

/// Registro inicial + heartbeats periódicos.
pub async fn run(state: WorkerState, interval: Option<Duration>) {
    if let Err(e) = register_with_coordinator(&state).await {
        warn!(
            "no se pudo registrar el worker {} en {}: {:?}",
            state.config.worker_id, state.config.coordinator_url, e
        );
    }

    let Some(interval) = interval else {
        info!("heartbeat periódico desactivado");
        return;
    };

    loop {
        sleep(interval).await;
        report_health(&state).await;
    }
}
