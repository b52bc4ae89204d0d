use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delta empujado al acumulador. Los campos ausentes valen 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsDelta {
    #[serde(default)]
    pub error_rate_per_minute: f64,
    #[serde(default)]
    pub average_response_time: f64,
    #[serde(default)]
    pub request_count_per_second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerSnapshot {
    pub error_rate_per_minute: f64,
    pub average_response_time: f64,
    pub request_count_per_second: f64,
    /// Cantidad de deltas acumulados desde `since`
    pub updates: u64,
    pub since: DateTime<Utc>,
}

/// Totales acumulados de métricas empujadas desde afuera.
///
/// No hay ventana ni decaimiento: pese a los nombres, cada campo es la suma
/// de todos los deltas recibidos desde el último `reset`. Es independiente
/// de la agregación por pedido de `aggregate`.
#[derive(Debug, Clone)]
pub struct Analyzer {
    totals: MetricsDelta,
    updates: u64,
    since: DateTime<Utc>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            totals: MetricsDelta::default(),
            updates: 0,
            since: Utc::now(),
        }
    }

    pub fn update(&mut self, delta: &MetricsDelta) {
        self.totals.error_rate_per_minute += delta.error_rate_per_minute;
        self.totals.average_response_time += delta.average_response_time;
        self.totals.request_count_per_second += delta.request_count_per_second;
        self.updates += 1;
    }

    pub fn snapshot(&self) -> AnalyzerSnapshot {
        AnalyzerSnapshot {
            error_rate_per_minute: self.totals.error_rate_per_minute,
            average_response_time: self.totals.average_response_time,
            request_count_per_second: self.totals.request_count_per_second,
            updates: self.updates,
            since: self.since,
        }
    }

    /// Pone los totales en cero y devuelve lo acumulado hasta ahora.
    pub fn reset(&mut self) -> AnalyzerSnapshot {
        let previous = self.snapshot();
        *self = Self::new();
        previous
    }
}
