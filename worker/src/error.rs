use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{ErrorBody, ScanError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("error interno: {0}")]
    Internal(String),
}

impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            WorkerError::Scan(ScanError::FileNotFound(_)) => StatusCode::NOT_FOUND,
            WorkerError::Scan(ScanError::Io(_)) | WorkerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
