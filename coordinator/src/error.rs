use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{ErrorBody, PlanError, WorkerId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),

    #[error("no hay workers disponibles")]
    NoWorkersAvailable,

    #[error("falló el worker {worker_id} con el chunk {chunk_index}: {reason}")]
    WorkerCallFailed {
        worker_id: WorkerId,
        chunk_index: usize,
        reason: String,
    },

    #[error("archivo no encontrado: {0}")]
    FileNotFound(String),

    #[error("error de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("error interno: {0}")]
    Internal(String),
}

impl From<PlanError> for CoordinatorError {
    fn from(e: PlanError) -> Self {
        CoordinatorError::InvalidArgument(e.to_string())
    }
}

impl CoordinatorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CoordinatorError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CoordinatorError::NoWorkersAvailable => StatusCode::SERVICE_UNAVAILABLE,
            CoordinatorError::WorkerCallFailed { .. } => StatusCode::BAD_GATEWAY,
            CoordinatorError::FileNotFound(_) => StatusCode::NOT_FOUND,
            CoordinatorError::Io(_) | CoordinatorError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for CoordinatorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = ErrorBody::new(self.to_string());
        if let CoordinatorError::WorkerCallFailed {
            worker_id,
            chunk_index,
            ..
        } = self
        {
            body.worker_id = Some(worker_id);
            body.chunk_index = Some(chunk_index);
        }
        (status, Json(body)).into_response()
    }
}
