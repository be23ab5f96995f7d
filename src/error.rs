use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use utoipa::ToSchema;

use crate::repo::RepoError;
use crate::validation::{FieldError, ValidationError};

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")] BadRequest(String),
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error("{0}")] NotFound(String),
    #[error("too many reports, slow down")] TooManyRequests,
    #[error("{0}")] Unavailable(String),
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::SessionNotFound => ApiError::NotFound("session not found or expired".into()),
            RepoError::SessionLimit => ApiError::Unavailable("session limit reached, try again later".into()),
            RepoError::OutOfRange { .. } => ApiError::NotFound(format!("{e}; refresh the list and retry")),
            RepoError::ReportNotFound(_) => ApiError::NotFound(e.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let fields = match self {
            ApiError::Validation(v) => v.fields.clone(),
            _ => Vec::new(),
        };
        HttpResponse::build(self.status_code()).json(ApiErrorBody { error: self.to_string(), fields })
    }
}
