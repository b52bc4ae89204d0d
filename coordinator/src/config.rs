use std::{env, str::FromStr, time::Duration};

use crate::dispatch::DispatchMode;

/// Umbrales del monitor de heartbeats.
#[derive(Debug, Clone, Copy)]
pub struct LivenessPolicy {
    pub suspect_after: Duration,
    pub fail_after: Duration,
    pub sweep_interval: Duration,
}

pub const DEFAULT_LIVENESS: LivenessPolicy = LivenessPolicy {
    suspect_after: Duration::from_secs(15),
    fail_after: Duration::from_secs(45),
    sweep_interval: Duration::from_secs(5),
};

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub bind: String,
    pub port: u16,
    pub dispatch_mode: DispatchMode,
    /// `None` = los workers nunca se degradan
    pub liveness: Option<LivenessPolicy>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
            dispatch_mode: DispatchMode::Sequential,
            liveness: None,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env_parsed(key).unwrap_or(default)
}

/// Política de degradación a partir de los valores de entorno.
///
/// Sólo se activa si `fail_secs` viene y es > 0; los demás valores caen a
/// `DEFAULT_LIVENESS` cuando faltan.
pub fn liveness_policy(
    fail_secs: Option<u64>,
    suspect_secs: Option<u64>,
    sweep_secs: Option<u64>,
) -> Option<LivenessPolicy> {
    let fail_secs = fail_secs.filter(|secs| *secs > 0)?;
    let suspect_secs = suspect_secs.unwrap_or(DEFAULT_LIVENESS.suspect_after.as_secs());
    let sweep_secs = sweep_secs
        .unwrap_or(DEFAULT_LIVENESS.sweep_interval.as_secs())
        .max(1);

    Some(LivenessPolicy {
        // suspected nunca llega después de failed
        suspect_after: Duration::from_secs(suspect_secs.min(fail_secs)),
        fail_after: Duration::from_secs(fail_secs),
        sweep_interval: Duration::from_secs(sweep_secs),
    })
}

fn env_parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

impl CoordinatorConfig {
    /// Lee la configuración de variables de entorno; lo que falte o no
    /// parsee queda con el valor por defecto. La degradación de workers
    /// queda apagada salvo que se defina WORKER_FAIL_AFTER_SECS > 0.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let liveness = liveness_policy(
            env_parsed("WORKER_FAIL_AFTER_SECS"),
            env_parsed("WORKER_SUSPECT_AFTER_SECS"),
            env_parsed("MONITOR_INTERVAL_SECS"),
        );

        Self {
            bind: env_or("COORDINATOR_BIND", defaults.bind),
            port: env_or("COORDINATOR_PORT", defaults.port),
            dispatch_mode: env_or("DISPATCH_MODE", defaults.dispatch_mode),
            liveness,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn por_defecto_los_workers_no_se_degradan() {
        let config = CoordinatorConfig::default();
        assert!(config.liveness.is_none());
        assert_eq!(config.dispatch_mode, DispatchMode::Sequential);
    }

    #[test]
    fn sin_fail_after_no_hay_politica() {
        assert!(liveness_policy(None, None, None).is_none());
        assert!(liveness_policy(None, Some(10), Some(2)).is_none());
        assert!(liveness_policy(Some(0), Some(10), None).is_none());
    }

    #[test]
    fn fail_after_explicito_activa_la_degradacion() {
        let p = liveness_policy(Some(30), None, None).unwrap();
        assert_eq!(p.fail_after, Duration::from_secs(30));
        assert_eq!(p.suspect_after, DEFAULT_LIVENESS.suspect_after);
        assert_eq!(p.sweep_interval, DEFAULT_LIVENESS.sweep_interval);

        // suspect_after se recorta a fail_after y el intervalo mínimo es 1s
        let p = liveness_policy(Some(5), Some(20), Some(0)).unwrap();
        assert_eq!(p.suspect_after, Duration::from_secs(5));
        assert_eq!(p.sweep_interval, Duration::from_secs(1));
    }
}
