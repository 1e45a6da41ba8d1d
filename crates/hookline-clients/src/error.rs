//! Errors returned by the outbound clients.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("{endpoint} request failed: {source}")]
  Transport {
    endpoint: &'static str,
    #[source]
    source:   reqwest::Error,
  },

  #[error("{endpoint} returned {status}")]
  Status {
    endpoint: &'static str,
    status:   StatusCode,
  },

  #[error("{endpoint} returned an unreadable body: {source}")]
  Decode {
    endpoint: &'static str,
    #[source]
    source:   reqwest::Error,
  },

  #[error("slack {endpoint} failed: {code}")]
  Slack {
    endpoint: &'static str,
    code:     String,
  },
}
