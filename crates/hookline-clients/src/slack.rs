//! Slack Web API client: user listing and message posting.

use hookline_core::{
  identity::ChatAccount,
  ports::{ChatDirectory, ChatSender},
};
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{ClientError, http_client};

const USERS_LIST: &str = "users.list";
const POST_MESSAGE: &str = "chat.postMessage";
const PAGE_LIMIT: &str = "200";

/// Slack Web API client authenticated with a bot token.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SlackClient {
  client:   Client,
  api_url:  String,
  token:    String,
  bot_name: String,
}

// ─── Wire types ──────────────────────────────────────────────────────────────

/// Every Web API response carries `ok`, and `error` when `ok` is false.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  ok:    bool,
  #[serde(default)]
  error: Option<String>,
  #[serde(flatten)]
  body:  T,
}

#[derive(Debug, Default, Deserialize)]
struct UsersPage {
  #[serde(default)]
  members:           Vec<Member>,
  #[serde(default)]
  response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
  #[serde(default)]
  next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct Member {
  id:      String,
  #[serde(default)]
  name:    String,
  #[serde(default)]
  deleted: bool,
  #[serde(default)]
  is_bot:  bool,
  #[serde(default)]
  profile: Profile,
}

#[derive(Debug, Default, Deserialize)]
struct Profile {
  #[serde(default)]
  email: Option<String>,
}

impl Member {
  /// Deleted users, bots and members without an email can never be linked.
  fn into_account(self) -> Option<ChatAccount> {
    if self.deleted || self.is_bot {
      return None;
    }
    let email = self.profile.email.filter(|e| !e.is_empty())?;
    Some(ChatAccount { email, id: self.id, name: self.name })
  }
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
  channel:     &'a str,
  text:        &'a str,
  username:    &'a str,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  attachments: Vec<Attachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Attachment<'a> {
  text: &'a str,
}

#[derive(Debug, Deserialize)]
struct Empty {}

// ─── Client ──────────────────────────────────────────────────────────────────

impl SlackClient {
  /// `api_url` is the Web API root, e.g. `https://slack.com/api`.
  /// `bot_name` is the display name messages are posted under.
  pub fn new(
    api_url: impl Into<String>,
    token: impl Into<String>,
    bot_name: impl Into<String>,
  ) -> Result<Self, ClientError> {
    Ok(Self {
      client:   http_client()?,
      api_url:  api_url.into(),
      token:    token.into(),
      bot_name: bot_name.into(),
    })
  }

  fn url(&self, method: &str) -> String {
    format!("{}/{}", self.api_url.trim_end_matches('/'), method)
  }

  async fn read<T: DeserializeOwned>(
    endpoint: &'static str,
    resp: reqwest::Response,
  ) -> Result<T, ClientError> {
    if !resp.status().is_success() {
      return Err(ClientError::Status { endpoint, status: resp.status() });
    }
    let envelope: Envelope<T> = resp
      .json()
      .await
      .map_err(|source| ClientError::Decode { endpoint, source })?;
    if !envelope.ok {
      return Err(ClientError::Slack {
        endpoint,
        code: envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
      });
    }
    Ok(envelope.body)
  }

  async fn users_page(&self, cursor: Option<&str>) -> Result<UsersPage, ClientError> {
    let mut req = self
      .client
      .get(self.url(USERS_LIST))
      .bearer_auth(&self.token)
      .query(&[("limit", PAGE_LIMIT)]);
    if let Some(cursor) = cursor {
      req = req.query(&[("cursor", cursor)]);
    }
    let resp = req
      .send()
      .await
      .map_err(|source| ClientError::Transport { endpoint: USERS_LIST, source })?;
    Self::read(USERS_LIST, resp).await
  }
}

impl ChatDirectory for SlackClient {
  type Error = ClientError;

  /// Walk every page of `users.list`, following `next_cursor`.
  async fn list_accounts(&self) -> Result<Vec<ChatAccount>, ClientError> {
    let mut accounts = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
      let page = self.users_page(cursor.as_deref()).await?;
      accounts.extend(page.members.into_iter().filter_map(Member::into_account));
      match page.response_metadata.map(|m| m.next_cursor) {
        Some(next) if !next.is_empty() => cursor = Some(next),
        _ => break,
      }
    }
    tracing::debug!(accounts = accounts.len(), "listed slack users");
    Ok(accounts)
  }
}

impl ChatSender for SlackClient {
  type Error = ClientError;

  async fn post_message<'a>(
    &'a self,
    recipient: &'a str,
    text: &'a str,
    attachment: Option<&'a str>,
  ) -> Result<(), ClientError> {
    let body = PostMessage {
      channel: recipient,
      text,
      username: &self.bot_name,
      attachments: attachment.map(|text| Attachment { text }).into_iter().collect(),
    };
    let resp = self
      .client
      .post(self.url(POST_MESSAGE))
      .bearer_auth(&self.token)
      .json(&body)
      .send()
      .await
      .map_err(|source| ClientError::Transport { endpoint: POST_MESSAGE, source })?;
    Self::read::<Empty>(POST_MESSAGE, resp).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
  };

  use axum::{
    Json, Router,
    extract::{Query, State},
    http::HeaderMap,
    routing::{get, post},
  };
  use serde_json::{Value, json};

  use super::*;
  use crate::test_server;

  type Posted = Arc<Mutex<Vec<Value>>>;

  fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer xoxb")
  }

  async fn users_list(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
  ) -> Json<Value> {
    if !authorized(&headers) {
      return Json(json!({ "ok": false, "error": "invalid_auth" }));
    }
    match params.get("cursor").map(String::as_str) {
      None => Json(json!({
        "ok": true,
        "members": [
          { "id": "U1", "name": "alice", "profile": { "email": "a@x" } },
          { "id": "U2", "name": "ghost", "deleted": true, "profile": { "email": "g@x" } },
          { "id": "B1", "name": "ci-bot", "is_bot": true, "profile": {} }
        ],
        "response_metadata": { "next_cursor": "dXNlcjpVMg==" }
      })),
      Some(_) => Json(json!({
        "ok": true,
        "members": [
          { "id": "U3", "name": "bob", "profile": { "email": "b@x" } },
          { "id": "U4", "name": "noemail", "profile": { "email": "" } }
        ],
        "response_metadata": { "next_cursor": "" }
      })),
    }
  }

  async fn post_message(
    State(posted): State<Posted>,
    headers: HeaderMap,
    Json(body): Json<Value>,
  ) -> Json<Value> {
    if !authorized(&headers) {
      return Json(json!({ "ok": false, "error": "invalid_auth" }));
    }
    if body["channel"] == "nobody" {
      return Json(json!({ "ok": false, "error": "channel_not_found" }));
    }
    posted.lock().unwrap().push(body);
    Json(json!({ "ok": true, "channel": "D1", "ts": "1503435956.000247" }))
  }

  async fn server(posted: Posted) -> String {
    let router = Router::new()
      .route("/api/users.list", get(users_list))
      .route("/api/chat.postMessage", post(post_message))
      .with_state(posted);
    test_server::spawn(router).await
  }

  #[tokio::test]
  async fn lists_linkable_members_across_pages() {
    let base = server(Posted::default()).await;
    let client = SlackClient::new(format!("{base}/api"), "xoxb", "hookline").unwrap();

    let accounts = client.list_accounts().await.unwrap();
    assert_eq!(
      accounts,
      vec![
        ChatAccount { email: "a@x".into(), id: "U1".into(), name: "alice".into() },
        ChatAccount { email: "b@x".into(), id: "U3".into(), name: "bob".into() },
      ]
    );
  }

  #[tokio::test]
  async fn not_ok_response_is_a_slack_error() {
    let base = server(Posted::default()).await;
    let client = SlackClient::new(format!("{base}/api"), "bad", "hookline").unwrap();

    let err = client.list_accounts().await.unwrap_err();
    assert!(matches!(&err, ClientError::Slack { code, .. } if code == "invalid_auth"), "{err}");
  }

  #[tokio::test]
  async fn post_message_sends_text_attachment_and_bot_name() {
    let posted = Posted::default();
    let base = server(posted.clone()).await;
    let client = SlackClient::new(format!("{base}/api/"), "xoxb", "hookline").unwrap();

    client
      .post_message("U1", "bob made a comment", Some("This needs work."))
      .await
      .unwrap();
    client.post_message("U1", "Pipeline failed", None).await.unwrap();

    let posted = posted.lock().unwrap();
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[0]["channel"], "U1");
    assert_eq!(posted[0]["username"], "hookline");
    assert_eq!(posted[0]["attachments"][0]["text"], "This needs work.");
    assert!(posted[1].get("attachments").is_none());
  }

  #[tokio::test]
  async fn post_message_surfaces_slack_error_code() {
    let base = server(Posted::default()).await;
    let client = SlackClient::new(format!("{base}/api"), "xoxb", "hookline").unwrap();

    let err = client.post_message("nobody", "hi", None).await.unwrap_err();
    assert!(matches!(&err, ClientError::Slack { code, .. } if code == "channel_not_found"), "{err}");
  }
}
