//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use hr_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store failure by its domain error kind.
  pub fn store(err: impl Into<hr_core::Error>) -> Self { Self::from(err.into()) }
}

impl From<hr_core::Error> for ApiError {
  fn from(err: hr_core::Error) -> Self {
    match err.kind() {
      ErrorKind::Validation => Self::BadRequest(err.to_string()),
      ErrorKind::NotFound => Self::NotFound(err.to_string()),
      ErrorKind::Conflict => Self::Conflict(err.to_string()),
      ErrorKind::Storage => Self::Store(Box::new(err)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
