use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResearchError>;

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Webhook non-2xx, timeout, network error or a response we can't interpret.
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// One record of a callback payload could not be written.
    #[error("Partial ingest failure: {0}")]
    PartialIngestFailure(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<reqwest::Error> for ResearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResearchError::UpstreamFailure(format!("request timed out: {}", e))
        } else if let Some(status) = e.status() {
            ResearchError::UpstreamFailure(format!("upstream returned {}", status))
        } else {
            ResearchError::UpstreamFailure(e.to_string())
        }
    }
}

impl ResponseError for ResearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            ResearchError::NotFound(_) => StatusCode::NOT_FOUND,
            ResearchError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ResearchError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ResearchError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ResearchError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            ResearchError::PartialIngestFailure(_) | ResearchError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ResearchError::Database(e) = self {
            log::error!("Database error while serving request: {:?}", e);
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
