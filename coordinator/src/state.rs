// coordinator/src/state.rs

use chrono::{DateTime, Utc};
use common::{Analyzer, WorkerHeartbeatRequest, WorkerId, WorkerInfo, WorkerStatus};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::SystemTime,
};

use crate::config::{CoordinatorConfig, LivenessPolicy};
use crate::dispatch::Dispatcher;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<WorkerRegistry>,
    pub dispatcher: Dispatcher,
    // acumulador global, aparte de la agregación por pedido
    pub analyzer: Arc<Mutex<Analyzer>>,
}

impl AppState {
    pub fn new(config: &CoordinatorConfig) -> Self {
        Self {
            registry: Arc::new(WorkerRegistry::default()),
            dispatcher: Dispatcher::new(config.dispatch_mode),
            analyzer: Arc::new(Mutex::new(Analyzer::new())),
        }
    }

    pub fn analyzer(&self) -> MutexGuard<'_, Analyzer> {
        self.analyzer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct WorkerEntry {
    pub endpoint: String,
    pub status: WorkerStatus,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat: SystemTime,

    // Últimas métricas de host reportadas en un heartbeat
    pub cpu_percent: Option<f32>,
    pub mem_bytes: Option<u64>,
}

/// Worker elegible para recibir chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerTarget {
    pub id: WorkerId,
    pub endpoint: String,
}

#[derive(Default)]
struct RegistryInner {
    workers: HashMap<WorkerId, WorkerEntry>,
    // orden de inserción, define el ciclo del round-robin
    worker_order: Vec<WorkerId>,
}

/// Registro de workers del coordinator. Las entradas nunca se borran.
#[derive(Default)]
pub struct WorkerRegistry {
    inner: Mutex<RegistryInner>,
}

impl WorkerRegistry {
    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserta o sobreescribe la entrada de `worker_id` como activa.
    /// Un re-registro conserva su lugar en el orden. Devuelve `true` si es nuevo.
    pub fn register(&self, worker_id: &str, endpoint: &str) -> bool {
        let mut inner = self.lock();
        let entry = WorkerEntry {
            endpoint: endpoint.to_string(),
            status: WorkerStatus::Active,
            registered_at: Utc::now(),
            last_heartbeat: SystemTime::now(),
            cpu_percent: None,
            mem_bytes: None,
        };

        let is_new = inner
            .workers
            .insert(worker_id.to_string(), entry)
            .is_none();
        if is_new {
            inner.worker_order.push(worker_id.to_string());
        }
        is_new
    }

    /// Refresca un worker conocido a `Active`. Un id desconocido se ignora
    /// (no crea entrada) y devuelve `false`.
    pub fn heartbeat(&self, req: &WorkerHeartbeatRequest) -> bool {
        let mut inner = self.lock();
        match inner.workers.get_mut(&req.worker_id) {
            Some(entry) => {
                entry.status = WorkerStatus::Active;
                entry.last_heartbeat = SystemTime::now();
                if req.cpu_percent.is_some() {
                    entry.cpu_percent = req.cpu_percent;
                }
                if req.mem_bytes.is_some() {
                    entry.mem_bytes = req.mem_bytes;
                }
                true
            }
            None => false,
        }
    }

    /// Workers elegibles en orden de inserción (excluye los `Failed`).
    pub fn snapshot(&self) -> Vec<WorkerTarget> {
        let inner = self.lock();
        inner
            .worker_order
            .iter()
            .filter_map(|id| {
                let entry = inner.workers.get(id)?;
                entry.status.is_dispatchable().then(|| WorkerTarget {
                    id: id.clone(),
                    endpoint: entry.endpoint.clone(),
                })
            })
            .collect()
    }

    pub fn status(&self, worker_id: &str) -> Option<WorkerStatus> {
        self.lock().workers.get(worker_id).map(|e| e.status)
    }

    pub fn len(&self) -> usize {
        self.lock().worker_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn list(&self, now: SystemTime) -> Vec<WorkerInfo> {
        let inner = self.lock();
        inner
            .worker_order
            .iter()
            .filter_map(|id| {
                let meta = inner.workers.get(id)?;
                let age_secs = now
                    .duration_since(meta.last_heartbeat)
                    .unwrap_or_default()
                    .as_secs();

                Some(WorkerInfo {
                    worker_id: id.clone(),
                    worker_url: meta.endpoint.clone(),
                    status: meta.status,
                    registered_at: meta.registered_at,
                    last_heartbeat_secs_ago: age_secs,
                    cpu_percent: meta.cpu_percent,
                    mem_bytes: meta.mem_bytes,
                })
            })
            .collect()
    }

    /// Degrada los workers sin heartbeat reciente. Sólo baja de estado;
    /// volver a `Active` es cosa de `heartbeat`/`register`.
    /// Devuelve las transiciones hechas en esta pasada.
    pub fn sweep(&self, now: SystemTime, policy: &LivenessPolicy) -> Vec<(WorkerId, WorkerStatus)> {
        let mut inner = self.lock();
        let RegistryInner {
            workers,
            worker_order,
        } = &mut *inner;

        let mut transitions = Vec::new();
        for id in worker_order.iter() {
            let Some(meta) = workers.get_mut(id) else {
                continue;
            };
            // last_heartbeat en el futuro (reloj movido): se ignora
            let Ok(elapsed) = now.duration_since(meta.last_heartbeat) else {
                continue;
            };

            let next = if elapsed > policy.fail_after {
                WorkerStatus::Failed
            } else if elapsed > policy.suspect_after {
                WorkerStatus::Suspected
            } else {
                continue;
            };

            let demotes = matches!(
                (meta.status, next),
                (WorkerStatus::Active, _) | (WorkerStatus::Suspected, WorkerStatus::Failed)
            );
            if demotes {
                meta.status = next;
                transitions.push((id.clone(), next));
            }
        }

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn policy() -> LivenessPolicy {
        LivenessPolicy {
            suspect_after: Duration::from_secs(10),
            fail_after: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(1),
        }
    }

    fn ids(targets: &[WorkerTarget]) -> Vec<&str> {
        targets.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn register_mantiene_orden_de_insercion() {
        let reg = WorkerRegistry::default();
        assert!(reg.register("w2", "http://w2:8001"));
        assert!(reg.register("w1", "http://w1:8001"));
        assert!(reg.register("w3", "http://w3:8001"));

        assert_eq!(ids(&reg.snapshot()), vec!["w2", "w1", "w3"]);
    }

    #[test]
    fn re_registro_sobreescribe_sin_mover_el_lugar() {
        let reg = WorkerRegistry::default();
        reg.register("a", "http://viejo");
        reg.register("b", "http://b");
        assert!(!reg.register("a", "http://nuevo"));

        let snap = reg.snapshot();
        assert_eq!(ids(&snap), vec!["a", "b"]);
        assert_eq!(snap[0].endpoint, "http://nuevo");
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn heartbeat_de_desconocido_no_crea_entrada() {
        let reg = WorkerRegistry::default();
        assert!(!reg.heartbeat(&WorkerHeartbeatRequest::bare("fantasma")));
        assert!(reg.is_empty());
        assert!(reg.status("fantasma").is_none());
    }

    #[test]
    fn heartbeat_guarda_metricas_de_host() {
        let reg = WorkerRegistry::default();
        reg.register("w1", "http://w1");
        assert!(reg.heartbeat(&WorkerHeartbeatRequest {
            worker_id: "w1".into(),
            cpu_percent: Some(12.5),
            mem_bytes: Some(1024),
        }));

        let info = reg.list(SystemTime::now());
        assert_eq!(info[0].cpu_percent, Some(12.5));
        assert_eq!(info[0].mem_bytes, Some(1024));

        // un heartbeat sin métricas no borra las anteriores
        reg.heartbeat(&WorkerHeartbeatRequest::bare("w1"));
        assert_eq!(reg.list(SystemTime::now())[0].mem_bytes, Some(1024));
    }

    #[test]
    fn sweep_degrada_y_heartbeat_recupera() {
        let reg = WorkerRegistry::default();
        reg.register("w1", "http://w1");
        reg.register("w2", "http://w2");
        let base = SystemTime::now();

        // todavía dentro del umbral
        assert!(reg.sweep(base + Duration::from_secs(5), &policy()).is_empty());

        let t = reg.sweep(base + Duration::from_secs(15), &policy());
        assert_eq!(t.len(), 2);
        assert_eq!(reg.status("w1"), Some(WorkerStatus::Suspected));
        // suspected sigue siendo elegible
        assert_eq!(reg.snapshot().len(), 2);

        // sin cambios si se repite la pasada
        assert!(reg.sweep(base + Duration::from_secs(16), &policy()).is_empty());

        let t = reg.sweep(base + Duration::from_secs(31), &policy());
        assert_eq!(
            t,
            vec![
                ("w1".to_string(), WorkerStatus::Failed),
                ("w2".to_string(), WorkerStatus::Failed),
            ]
        );
        assert!(reg.snapshot().is_empty());
        // los fallidos siguen en el registro
        assert_eq!(reg.len(), 2);

        reg.heartbeat(&WorkerHeartbeatRequest::bare("w2"));
        assert_eq!(reg.status("w2"), Some(WorkerStatus::Active));
        assert_eq!(ids(&reg.snapshot()), vec!["w2"]);
    }

    #[test]
    fn sweep_puede_saltar_directo_a_failed() {
        let reg = WorkerRegistry::default();
        reg.register("w1", "http://w1");
        let t = reg.sweep(SystemTime::now() + Duration::from_secs(100), &policy());
        assert_eq!(t, vec![("w1".to_string(), WorkerStatus::Failed)]);
    }
}
