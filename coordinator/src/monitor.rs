use std::{sync::Arc, time::SystemTime};

use common::WorkerStatus;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::LivenessPolicy;
use crate::state::WorkerRegistry;

/// Loop de liveness: cada `sweep_interval` degrada los workers que dejaron
/// de mandar heartbeats.
pub async fn monitor_workers(registry: Arc<WorkerRegistry>, policy: LivenessPolicy) {
    info!(
        "monitor de workers activo (suspected tras {:?}, failed tras {:?})",
        policy.suspect_after, policy.fail_after
    );
    loop {
        sleep(policy.sweep_interval).await;
        sweep_once(&registry, SystemTime::now(), &policy);
    }
}

/// Una pasada del monitor. Devuelve cuántos workers cambiaron de estado.
pub fn sweep_once(registry: &WorkerRegistry, now: SystemTime, policy: &LivenessPolicy) -> usize {
    let transitions = registry.sweep(now, policy);

    for (worker_id, status) in &transitions {
        match status {
            WorkerStatus::Failed => warn!(
                "marcando worker {} como FAILED, queda fuera del round-robin",
                worker_id
            ),
            _ => info!("worker {} sin heartbeat reciente: {:?}", worker_id, status),
        }
    }

    transitions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn sweep_once_cuenta_transiciones() {
        let registry = WorkerRegistry::default();
        registry.register("w1", "http://w1");
        let policy = LivenessPolicy {
            suspect_after: Duration::from_secs(1),
            fail_after: Duration::from_secs(2),
            sweep_interval: Duration::from_secs(1),
        };

        let later = SystemTime::now() + Duration::from_secs(60);
        assert_eq!(sweep_once(&registry, later, &policy), 1);
        assert_eq!(sweep_once(&registry, later, &policy), 0);
        assert_eq!(registry.status("w1"), Some(WorkerStatus::Failed));
    }
}
