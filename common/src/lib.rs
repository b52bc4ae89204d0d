pub mod aggregate;
pub mod analyzer;
pub mod chunk;
pub mod logscan;
pub mod results;
pub mod task;
pub mod worker;

pub use aggregate::aggregate;
pub use analyzer::{Analyzer, AnalyzerSnapshot, MetricsDelta};
pub use chunk::{plan_chunks, Chunk, PlanError};
pub use logscan::{scan_chunk, ScanError};
pub use results::{AggregateResult, ChunkResult, ErrorBody};
pub use task::{ChunkRequest, ProcessChunkRequest};
pub use worker::{WorkerHeartbeatRequest, WorkerId, WorkerInfo, WorkerRegisterRequest, WorkerStatus};
