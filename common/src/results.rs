use serde::{Deserialize, Serialize};

/// Métricas de un solo chunk, tal como las devuelve un worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Cantidad de líneas que hicieron match (no es una tasa, pese al nombre)
    pub requests_per_second: u64,
    /// Promedio en ms de las líneas que hicieron match
    pub avg_response_time: f64,
    pub malformed_lines: u64,
    /// Siempre 0.0: ninguna línea del formato indica error
    pub error_rate: f64,
}

/// Resumen combinado de todos los chunks de un pedido.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub avg_response_time: f64,
    pub requests_per_second: u64,
    pub error_rate: f64,
    pub malformed_lines: u64,
}

/// Cuerpo JSON de cualquier respuesta de error (coordinator y worker).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            worker_id: None,
            chunk_index: None,
        }
    }
}
