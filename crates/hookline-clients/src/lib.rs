//! HTTP clients for the services hookline talks to.
//!
//! [`GitlabClient`] lists GitLab accounts; [`SlackClient`] lists Slack
//! accounts and posts messages. Both implement the traits in
//! [`hookline_core::ports`] and are cheap to clone.

pub mod error;
pub mod gitlab;
pub mod slack;

pub use error::ClientError;
pub use gitlab::GitlabClient;
pub use slack::SlackClient;

use std::time::Duration;

/// Per-request timeout applied to every outbound call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn http_client() -> Result<reqwest::Client, ClientError> {
  reqwest::Client::builder()
    .timeout(REQUEST_TIMEOUT)
    .build()
    .map_err(ClientError::Build)
}

#[cfg(test)]
pub(crate) mod test_server {
  use axum::Router;
  use tokio::net::TcpListener;

  /// Serve `router` on an ephemeral local port and return its base URL.
  pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, router).await.unwrap();
    });
    format!("http://{address}")
  }
}
