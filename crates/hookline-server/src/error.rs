//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use hookline_core::error::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("body must not be empty")]
  EmptyBody,
  #[error("{0}")]
  Rejected(&'static str),
  #[error("JSON decoding error: {0}")]
  Decode(#[source] serde_json::Error),
  #[error("user discovery error: {0} not found")]
  UserDiscovery(Role),
  #[error("internal error: {0}")]
  Internal(#[source] hookline_core::Error),
}

impl From<hookline_core::Error> for Error {
  fn from(e: hookline_core::Error) -> Self {
    match e {
      hookline_core::Error::Rejected(reason) => Error::Rejected(reason),
      hookline_core::Error::UserDiscovery(role) => Error::UserDiscovery(role),
      hookline_core::Error::Decode(e) => Error::Decode(e),
      other => Error::Internal(other),
    }
  }
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::EmptyBody | Error::Rejected(_) => StatusCode::BAD_REQUEST,
      Error::Decode(_) | Error::UserDiscovery(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      Error::Unauthorized => String::new(),
      Error::EmptyBody => "Body must not be empty".to_string(),
      Error::UserDiscovery(_) => "User discovery error".to_string(),
      other => other.to_string(),
    };

    if status.is_server_error() {
      tracing::error!(status = status.as_u16(), error = %self, "returning error");
    } else {
      tracing::warn!(status = status.as_u16(), error = %self, "returning error");
    }

    (status, body).into_response()
  }
}
