//! Shared-secret extractor for GitLab webhook requests.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};

use crate::{AppState, error::Error};

/// Header GitLab fills with the webhook's secret token.
pub const TOKEN_HEADER: &str = "x-gitlab-token";

/// The secret accepted for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub secret_token: String,
}

/// Zero-size marker: present in the handler means the request was authenticated.
pub struct Authenticated;

/// Check the webhook secret directly from headers.
pub fn verify_token(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let token = headers
    .get(TOKEN_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  if token != config.secret_token {
    return Err(Error::Unauthorized);
  }
  Ok(())
}

impl FromRequestParts<AppState> for Authenticated {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    verify_token(&parts.headers, &state.auth)?;
    Ok(Authenticated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn config() -> AuthConfig { AuthConfig { secret_token: "s3cret".into() } }

  fn headers(token: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
    h
  }

  #[test]
  fn matching_token() {
    assert!(verify_token(&headers("s3cret"), &config()).is_ok());
  }

  #[test]
  fn wrong_token() {
    assert!(matches!(verify_token(&headers("guess"), &config()), Err(Error::Unauthorized)));
  }

  #[test]
  fn token_is_case_sensitive() {
    assert!(matches!(verify_token(&headers("S3CRET"), &config()), Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_header() {
    assert!(matches!(verify_token(&HeaderMap::new(), &config()), Err(Error::Unauthorized)));
  }
}
