//! Collaborator traits the core calls out to.
//!
//! Implemented by the HTTP clients in `hookline-clients`, and by stubs in
//! tests. The core never sees a concrete client.
//!
//! All methods return `Send` futures so the traits can be used from tasks
//! spawned on a multi-threaded tokio runtime.

use std::future::Future;

use crate::identity::{ChatAccount, SourceAccount};

/// Read access to the source-hosting (GitLab) user directory.
pub trait SourceDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// List every active account.
  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<SourceAccount>, Self::Error>> + Send + '_;
}

/// Read access to the chat-platform (Slack) user directory.
pub trait ChatDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// List every account that could receive a message.
  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<ChatAccount>, Self::Error>> + Send + '_;
}

/// Message delivery on the chat platform.
pub trait ChatSender: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Post `text` to `recipient`, with `attachment` rendered underneath when
  /// present.
  fn post_message<'a>(
    &'a self,
    recipient: &'a str,
    text: &'a str,
    attachment: Option<&'a str>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
