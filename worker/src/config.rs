use std::{env, str::FromStr, time::Duration};

const DEFAULT_WORKER_ID: &str = "worker1";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub bind: String,
    pub port: u16,
    pub worker_id: String,
    /// URL que se anuncia al coordinator; el coordinator le agrega /process
    pub worker_url: String,
    pub coordinator_url: String,
    /// `None` = sólo se manda heartbeat cuando lo piden por GET /heartbeat
    pub heartbeat_interval: Option<Duration>,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Nombre de host como id por defecto (como hace el registro del master)
fn default_worker_id() -> String {
    let host = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    if host.is_empty() {
        DEFAULT_WORKER_ID.to_string()
    } else {
        host
    }
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        let port: u16 = env_or("WORKER_PORT", 8001);
        let heartbeat_secs: u64 = env_or("HEARTBEAT_INTERVAL_SECS", 5);

        Self {
            bind: env_or("WORKER_BIND", "0.0.0.0".to_string()),
            port,
            worker_id: env::var("WORKER_ID").unwrap_or_else(|_| default_worker_id()),
            worker_url: env::var("WORKER_URL")
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            coordinator_url: env::var("COORDINATOR_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            heartbeat_interval: (heartbeat_secs > 0).then(|| Duration::from_secs(heartbeat_secs)),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn coordinator_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.coordinator_url.trim_end_matches('/'), path)
    }
}
