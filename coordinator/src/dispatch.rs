use std::str::FromStr;

use common::{Chunk, ChunkRequest, ChunkResult};
use reqwest::Client;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::CoordinatorError;
use crate::state::WorkerTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Un chunk en vuelo a la vez, en orden
    Sequential,
    /// Un carril por worker; cada carril manda sus chunks de a uno
    Parallel,
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(DispatchMode::Sequential),
            "parallel" => Ok(DispatchMode::Parallel),
            other => Err(format!("modo de dispatch desconocido: {other}")),
        }
    }
}

/// Worker al que le toca el chunk `index`: `workers[index mod N]`.
pub fn assign_worker(workers: &[WorkerTarget], index: usize) -> Option<&WorkerTarget> {
    if workers.is_empty() {
        return None;
    }
    workers.get(index % workers.len())
}

#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    mode: DispatchMode,
}

impl Dispatcher {
    pub fn new(mode: DispatchMode) -> Self {
        Self {
            client: Client::new(),
            mode,
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Manda cada chunk a su worker por round-robin sobre `workers` y
    /// devuelve un resultado por chunk, en el orden de `chunks`.
    ///
    /// El primer fallo aborta todo el pedido; los resultados parciales se
    /// descartan y el chunk no se reasigna.
    pub async fn dispatch(
        &self,
        workers: &[WorkerTarget],
        chunks: &[Chunk],
        filepath: &str,
    ) -> Result<Vec<ChunkResult>, CoordinatorError> {
        if workers.is_empty() {
            return Err(CoordinatorError::NoWorkersAvailable);
        }

        match self.mode {
            DispatchMode::Sequential => self.dispatch_sequential(workers, chunks, filepath).await,
            DispatchMode::Parallel => self.dispatch_parallel(workers, chunks, filepath).await,
        }
    }

    async fn dispatch_sequential(
        &self,
        workers: &[WorkerTarget],
        chunks: &[Chunk],
        filepath: &str,
    ) -> Result<Vec<ChunkResult>, CoordinatorError> {
        let mut results = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            let target = assign_worker(workers, index).ok_or(CoordinatorError::NoWorkersAvailable)?;
            let result = self.send_chunk(target, index, chunk, filepath).await?;
            results.push(result);
        }

        Ok(results)
    }

    async fn dispatch_parallel(
        &self,
        workers: &[WorkerTarget],
        chunks: &[Chunk],
        filepath: &str,
    ) -> Result<Vec<ChunkResult>, CoordinatorError> {
        let mut lanes = JoinSet::new();

        for (lane, target) in workers.iter().enumerate() {
            // mismos chunks que le tocarían en modo secuencial
            let assigned: Vec<(usize, Chunk)> = chunks
                .iter()
                .copied()
                .enumerate()
                .skip(lane)
                .step_by(workers.len())
                .collect();
            if assigned.is_empty() {
                continue;
            }

            let this = self.clone();
            let target = target.clone();
            let filepath = filepath.to_string();

            lanes.spawn(async move {
                let mut done = Vec::with_capacity(assigned.len());
                for (index, chunk) in assigned {
                    let result = this.send_chunk(&target, index, &chunk, &filepath).await?;
                    done.push((index, result));
                }
                Ok::<_, CoordinatorError>(done)
            });
        }

        let mut slots: Vec<Option<ChunkResult>> = vec![None; chunks.len()];
        while let Some(joined) = lanes.join_next().await {
            let lane_result = match joined {
                Ok(r) => r,
                Err(e) => Err(CoordinatorError::Internal(format!("carril de dispatch: {e}"))),
            };

            match lane_result {
                Ok(done) => {
                    for (index, result) in done {
                        slots[index] = Some(result);
                    }
                }
                Err(e) => {
                    lanes.abort_all();
                    return Err(e);
                }
            }
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CoordinatorError::Internal("faltan resultados de chunks".to_string()))
    }

    async fn send_chunk(
        &self,
        target: &WorkerTarget,
        index: usize,
        chunk: &Chunk,
        filepath: &str,
    ) -> Result<ChunkResult, CoordinatorError> {
        let failed = |reason: String| {
            warn!(
                "chunk {} (offset={}) falló en worker {}: {}",
                index, chunk.offset, target.id, reason
            );
            CoordinatorError::WorkerCallFailed {
                worker_id: target.id.clone(),
                chunk_index: index,
                reason,
            }
        };

        let url = format!("{}/process", target.endpoint.trim_end_matches('/'));
        debug!(
            "enviando chunk {} (offset={}, len={}) a worker {}",
            index, chunk.offset, chunk.length, target.id
        );

        let resp = self
            .client
            .post(&url)
            .json(&ChunkRequest {
                filepath: filepath.to_string(),
                start: chunk.offset,
                size: chunk.length,
            })
            .send()
            .await
            .map_err(|e| failed(format!("error HTTP: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(failed(format!("status {status}: {body}")));
        }

        resp.json::<ChunkResult>()
            .await
            .map_err(|e| failed(format!("respuesta inválida: {e}")))
    }
}
