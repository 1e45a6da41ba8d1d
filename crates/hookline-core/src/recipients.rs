//! The static allow-list of people who may receive notifications.

use crate::{Error, Result, identity::Identity};

/// GitLab usernames allowed to receive notifications.
///
/// Loaded once at startup and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRecipients {
  usernames: Vec<String>,
}

impl ActiveRecipients {
  /// Build the set from explicit usernames. Empty names are skipped.
  pub fn new<I, S>(usernames: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let usernames: Vec<String> = usernames
      .into_iter()
      .map(Into::into)
      .filter(|u| !u.is_empty())
      .collect();
    if usernames.is_empty() {
      return Err(Error::NoActiveRecipients);
    }
    Ok(Self { usernames })
  }

  /// Parse a comma-separated list such as `"alice,bob"`.
  ///
  /// Entries are taken verbatim: no trimming, no case folding.
  pub fn parse(csv: &str) -> Result<Self> { Self::new(csv.split(',')) }

  /// Exact, case-sensitive match on the GitLab username.
  pub fn is_active(&self, identity: &Identity) -> bool {
    self.usernames.iter().any(|u| *u == identity.source_username)
  }

  pub fn usernames(&self) -> &[String] { &self.usernames }
}
