use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use sysinfo::{System, SystemExt};

use crate::config::WorkerConfig;

#[derive(Clone)]
pub struct WorkerState {
    pub config: Arc<WorkerConfig>,
    pub client: Client,
    // System para leer CPU y memoria
    sys: Arc<Mutex<System>>,
}

impl WorkerState {
    pub fn new(config: WorkerConfig) -> Self {
        // primera lectura de CPU: el uso se calcula contra la anterior, sin
        // ésta el primer heartbeat reportaría 0%
        let mut sys = System::new();
        sys.refresh_cpu();

        Self {
            config: Arc::new(config),
            client: Client::new(),
            sys: Arc::new(Mutex::new(sys)),
        }
    }

    pub fn system(&self) -> MutexGuard<'_, System> {
        self.sys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
