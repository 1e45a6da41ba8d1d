//! The identity directory, a periodically rebuilt, immutable snapshot of
//! linked identities.
//!
//! Readers take an `Arc` to the current [`Snapshot`] and release the lock
//! straight away. [`Directory::refresh`] builds the replacement without
//! holding the lock and only takes the write guard to swap the pointer, so a
//! lookup always sees one complete snapshot.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::{
  identity::{ChatAccount, Identity, SourceAccount},
  ports::{ChatDirectory, SourceDirectory},
};

// ─── Lookup trait ────────────────────────────────────────────────────────────

/// The three correlation-key lookups the decision engine needs.
///
/// Every method returns the first matching identity, or `None` when nobody
/// matches. `None` is expected whenever an actor has no Slack account.
pub trait IdentityLookup {
  /// Match the GitLab ID of a merge request author.
  fn by_review_author(&self, id: u64) -> Option<&Identity>;
  /// Match the email recorded on a commit.
  fn by_commit_author(&self, email: &str) -> Option<&Identity>;
  /// Match the GitLab ID of a note author.
  fn by_comment_author(&self, id: u64) -> Option<&Identity>;
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// One complete generation of the directory.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  identities: Vec<Identity>,
  /// `None` until the first successful refresh.
  built_at:   Option<DateTime<Utc>>,
}

impl Snapshot {
  pub fn new(identities: Vec<Identity>) -> Self {
    Self { identities, built_at: Some(Utc::now()) }
  }

  pub fn identities(&self) -> &[Identity] { &self.identities }

  pub fn built_at(&self) -> Option<DateTime<Utc>> { self.built_at }

  pub fn len(&self) -> usize { self.identities.len() }

  pub fn is_empty(&self) -> bool { self.identities.is_empty() }
}

impl IdentityLookup for Snapshot {
  fn by_review_author(&self, id: u64) -> Option<&Identity> {
    self.identities.iter().find(|i| i.source_id == id)
  }

  fn by_commit_author(&self, email: &str) -> Option<&Identity> {
    self.identities.iter().find(|i| i.email == email)
  }

  fn by_comment_author(&self, id: u64) -> Option<&Identity> {
    self.identities.iter().find(|i| i.source_id == id)
  }
}

// ─── Correlation ─────────────────────────────────────────────────────────────

/// Pair every source account with the first chat account sharing its email.
///
/// Matching is exact and case-sensitive. Accounts without an email never
/// match, and unmatched accounts on either side are dropped. Output order
/// follows `source`, so when two GitLab accounts share an email the one
/// listed first is the one email lookups return.
pub fn correlate(source: &[SourceAccount], chat: &[ChatAccount]) -> Vec<Identity> {
  source
    .iter()
    .filter(|s| !s.email.is_empty())
    .filter_map(|s| {
      chat
        .iter()
        .find(|c| c.email == s.email)
        .map(|c| Identity::link(s, c))
    })
    .collect()
}

// ─── Refresh outcome ─────────────────────────────────────────────────────────

/// Why a refresh left the directory untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  ChatFetch(String),
  SourceFetch(String),
  ChatEmpty,
  SourceEmpty,
  NoMatches,
}

/// What a call to [`Directory::refresh`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
  Replaced { identities: usize },
  Skipped(SkipReason),
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// Process-wide holder of the current [`Snapshot`].
#[derive(Debug, Default)]
pub struct Directory {
  current: RwLock<Arc<Snapshot>>,
}

impl Directory {
  pub fn new() -> Self { Self::default() }

  /// Start from an already-built set of identities.
  pub fn with_identities(identities: Vec<Identity>) -> Self {
    Self { current: RwLock::new(Arc::new(Snapshot::new(identities))) }
  }

  /// The current snapshot. Holding it does not block a refresh.
  pub fn snapshot(&self) -> Arc<Snapshot> {
    let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&guard)
  }

  fn publish(&self, next: Snapshot) {
    let next = Arc::new(next);
    *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
  }

  pub fn lookup_by_review_author(&self, id: u64) -> Option<Identity> {
    self.snapshot().by_review_author(id).cloned()
  }

  pub fn lookup_by_commit_author(&self, email: &str) -> Option<Identity> {
    self.snapshot().by_commit_author(email).cloned()
  }

  pub fn lookup_by_comment_author(&self, id: u64) -> Option<Identity> {
    self.snapshot().by_comment_author(id).cloned()
  }

  /// Rebuild the directory from both account listings.
  ///
  /// Any fetch error, an empty listing, or a correlation with no pairs keeps
  /// the previous snapshot. Failures are logged here and reported through the
  /// returned [`RefreshOutcome`]; they are never raised.
  pub async fn refresh<G, C>(&self, source: &G, chat: &C) -> RefreshOutcome
  where
    G: SourceDirectory,
    C: ChatDirectory,
  {
    tracing::info!("refreshing identity directory");

    let chat_accounts = match chat.list_accounts().await {
      Ok(accounts) if accounts.is_empty() => {
        return self.skip(SkipReason::ChatEmpty);
      }
      Ok(accounts) => accounts,
      Err(e) => return self.skip(SkipReason::ChatFetch(e.to_string())),
    };

    let source_accounts = match source.list_accounts().await {
      Ok(accounts) if accounts.is_empty() => {
        return self.skip(SkipReason::SourceEmpty);
      }
      Ok(accounts) => accounts,
      Err(e) => return self.skip(SkipReason::SourceFetch(e.to_string())),
    };

    let identities = correlate(&source_accounts, &chat_accounts);
    if identities.is_empty() {
      return self.skip(SkipReason::NoMatches);
    }

    let count = identities.len();
    self.publish(Snapshot::new(identities));
    tracing::info!(
      identities = count,
      source_accounts = source_accounts.len(),
      chat_accounts = chat_accounts.len(),
      "identity directory replaced"
    );
    RefreshOutcome::Replaced { identities: count }
  }

  fn skip(&self, reason: SkipReason) -> RefreshOutcome {
    let kept = self.snapshot();
    let built_at = kept.built_at().map(|t| t.to_rfc3339());
    match &reason {
      SkipReason::ChatFetch(e) | SkipReason::SourceFetch(e) => tracing::error!(
        error = %e,
        kept = kept.len(),
        built_at = ?built_at,
        "directory refresh failed, keeping previous snapshot"
      ),
      other => tracing::warn!(
        reason = ?other,
        kept = kept.len(),
        built_at = ?built_at,
        "directory refresh produced no data, keeping previous snapshot"
      ),
    }
    RefreshOutcome::Skipped(reason)
  }
}
