//! Error types for `hookline-core`.

use std::fmt;

use thiserror::Error;

/// Which side of an event could not be matched against the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  /// The author of the commit or merge request the event is about.
  CodeOwner,
  /// The author of the note.
  Commenter,
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Role::CodeOwner => f.write_str("code owner"),
      Role::Commenter => f.write_str("commenter"),
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("event rejected: {0}")]
  Rejected(&'static str),

  #[error("user discovery error: {0} not found in directory")]
  UserDiscovery(Role),

  #[error("no active recipients configured")]
  NoActiveRecipients,

  #[error("payload decode error: {0}")]
  Decode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
