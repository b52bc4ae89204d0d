use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type WorkerId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRegisterRequest {
    pub worker_id: WorkerId,
    /// URL base donde el worker expone /process
    pub worker_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHeartbeatRequest {
    pub worker_id: WorkerId,

    // Métricas opcionales del host; un heartbeat "pelado" sólo trae el id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_bytes: Option<u64>,
}

impl WorkerHeartbeatRequest {
    pub fn bare(worker_id: impl Into<WorkerId>) -> Self {
        Self {
            worker_id: worker_id.into(),
            cpu_percent: None,
            mem_bytes: None,
        }
    }
}

/// Estado de un worker visto desde el coordinator.
///
/// `Suspected` sigue recibiendo chunks; `Failed` queda fuera del round-robin
/// hasta que llegue un heartbeat o un nuevo registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Active,
    Suspected,
    Failed,
}

impl WorkerStatus {
    pub fn is_dispatchable(self) -> bool {
        !matches!(self, WorkerStatus::Failed)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkerInfo {
    pub worker_id: WorkerId,
    pub worker_url: String,
    pub status: WorkerStatus,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat_secs_ago: u64,
    pub cpu_percent: Option<f32>,
    pub mem_bytes: Option<u64>,
}
