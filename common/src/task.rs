use serde::{Deserialize, Serialize};

/// Pedido del cliente al coordinator (`POST /process_chunk`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessChunkRequest {
    pub filepath: String,
    /// Con signo a propósito: valores <= 0 se rechazan como argumento inválido
    pub chunk_size: i64,
}

/// Lo que viaja del coordinator al worker (`POST /process`) por cada chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRequest {
    pub filepath: String,
    /// Offset en bytes
    pub start: u64,
    /// Presupuesto de bytes a leer desde `start`
    pub size: u64,
}
