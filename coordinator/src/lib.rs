pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod monitor;
pub mod state;

pub use config::{CoordinatorConfig, LivenessPolicy};
pub use dispatch::{DispatchMode, Dispatcher};
pub use error::CoordinatorError;
pub use handlers::build_router;
pub use state::{AppState, WorkerRegistry};
