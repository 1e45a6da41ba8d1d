//! GitLab user directory client.

use hookline_core::{identity::SourceAccount, ports::SourceDirectory};
use reqwest::Client;
use serde::Deserialize;

use crate::{ClientError, http_client};

const USERS_ENDPOINT: &str = "GET /users";
const PER_PAGE: &str = "100";

/// Lists active GitLab accounts through the REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GitlabClient {
  client:   Client,
  base_url: String,
  token:    String,
}

/// One element of `GET /users`. `email` is only visible to admin tokens;
/// otherwise `public_email` is the best available.
#[derive(Debug, Deserialize)]
struct GitlabUser {
  id:           u64,
  username:     String,
  #[serde(default)]
  email:        Option<String>,
  #[serde(default)]
  public_email: Option<String>,
}

impl GitlabUser {
  fn into_account(self) -> SourceAccount {
    let email = self
      .email
      .filter(|e| !e.is_empty())
      .or(self.public_email)
      .unwrap_or_default();
    SourceAccount { email, id: self.id, username: self.username }
  }
}

impl GitlabClient {
  /// `base_url` is the API root, e.g. `https://gitlab.com/api/v4`.
  pub fn new(
    base_url: impl Into<String>,
    token: impl Into<String>,
  ) -> Result<Self, ClientError> {
    Ok(Self {
      client:   http_client()?,
      base_url: base_url.into(),
      token:    token.into(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  /// Fetch one page and return it with the number of the next page, if any.
  async fn users_page(
    &self,
    page: &str,
  ) -> Result<(Vec<GitlabUser>, Option<String>), ClientError> {
    let resp = self
      .client
      .get(self.url("/users"))
      .header("PRIVATE-TOKEN", &self.token)
      .query(&[("active", "true"), ("per_page", PER_PAGE), ("page", page)])
      .send()
      .await
      .map_err(|source| ClientError::Transport { endpoint: USERS_ENDPOINT, source })?;

    if !resp.status().is_success() {
      return Err(ClientError::Status {
        endpoint: USERS_ENDPOINT,
        status:   resp.status(),
      });
    }

    let next = resp
      .headers()
      .get("x-next-page")
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .map(str::to_owned);

    let users = resp
      .json()
      .await
      .map_err(|source| ClientError::Decode { endpoint: USERS_ENDPOINT, source })?;
    Ok((users, next))
  }
}

impl SourceDirectory for GitlabClient {
  type Error = ClientError;

  /// Walk every page of `GET /users?active=true`.
  async fn list_accounts(&self) -> Result<Vec<SourceAccount>, ClientError> {
    let mut accounts = Vec::new();
    let mut page = String::from("1");
    loop {
      let (users, next) = self.users_page(&page).await?;
      accounts.extend(users.into_iter().map(GitlabUser::into_account));
      match next {
        Some(n) if n != page => page = n,
        _ => break,
      }
    }
    tracing::debug!(accounts = accounts.len(), "listed gitlab users");
    Ok(accounts)
  }
}
