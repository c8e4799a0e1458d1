use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::speech::TranscriptionError;
use crate::storage::upload_store::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        source: StorageError,
    },
    #[error("{0}")]
    Transcription(#[from] TranscriptionError),
    #[error("Malformed upload: {0}")]
    Multipart(String),
}

impl ApiError {
    pub fn storage(context: &'static str) -> impl FnOnce(StorageError) -> ApiError {
        move |source| ApiError::Storage { context, source }
    }
}

impl From<actix_multipart::MultipartError> for ApiError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        ApiError::Multipart(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage {
                source: StorageError::EmptyUpload,
                ..
            } => StatusCode::BAD_REQUEST,
            ApiError::Storage { .. } | ApiError::Transcription(_) | ApiError::Multipart(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            detail: self.to_string(),
        })
    }
}
