use crate::results::{AggregateResult, ChunkResult};

/// Combina los resultados de todos los chunks de un pedido.
///
/// El promedio se pondera por la cantidad de requests de cada chunk, así que
/// un chunk sin requests no mueve el resultado.
pub fn aggregate(results: &[ChunkResult]) -> AggregateResult {
    let mut total_requests: u64 = 0;
    let mut weighted_time: f64 = 0.0;
    let mut total_malformed: u64 = 0;

    for r in results {
        total_requests += r.requests_per_second;
        weighted_time += r.avg_response_time * r.requests_per_second as f64;
        total_malformed += r.malformed_lines;
    }

    let avg_response_time = if total_requests > 0 {
        weighted_time / total_requests as f64
    } else {
        0.0
    };

    AggregateResult {
        avg_response_time,
        requests_per_second: total_requests,
        error_rate: 0.0,
        malformed_lines: total_malformed,
    }
}
