pub mod config;
pub mod error;
pub mod handlers;
pub mod heartbeat;
pub mod state;

pub use config::WorkerConfig;
pub use error::WorkerError;
pub use handlers::build_router;
pub use state::WorkerState;
