//! One person linked across GitLab and Slack.
//!
//! Identities are never edited in place. The directory rebuilds all of them
//! from the two account listings on every refresh.

// ─── Account listings ────────────────────────────────────────────────────────

/// A GitLab account as returned by the user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAccount {
  pub email:    String,
  pub id:       u64,
  pub username: String,
}

/// A Slack account as returned by the user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAccount {
  pub email: String,
  pub id:    String,
  pub name:  String,
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// A GitLab account and a Slack account that share an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub email:           String,
  pub chat_id:         String,
  pub chat_name:       String,
  pub source_id:       u64,
  pub source_username: String,
}

impl Identity {
  /// Join a source account with the chat account it was correlated to.
  pub fn link(source: &SourceAccount, chat: &ChatAccount) -> Self {
    Self {
      email:           source.email.clone(),
      chat_id:         chat.id.clone(),
      chat_name:       chat.name.clone(),
      source_id:       source.id,
      source_username: source.username.clone(),
    }
  }

  /// Whether `self` and `other` should be treated as the same person.
  ///
  /// This is NOT structural equality: sharing any single attribute is
  /// enough. A shared email, chat ID, chat name, GitLab ID or GitLab
  /// username all count, so people commenting on their own work under a
  /// second account are not notified about it.
  pub fn same_person(&self, other: &Identity) -> bool {
    self.email == other.email
      || self.chat_id == other.chat_id
      || self.chat_name == other.chat_name
      || self.source_id == other.source_id
      || self.source_username == other.source_username
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn identity(n: u64) -> Identity {
    Identity {
      email:           format!("user{n}@example.com"),
      chat_id:         format!("U{n}"),
      chat_name:       format!("chat{n}"),
      source_id:       n,
      source_username: format!("user{n}"),
    }
  }

  #[test]
  fn distinct_people_are_not_the_same() {
    assert!(!identity(1).same_person(&identity(2)));
  }

  #[test]
  fn identical_records_are_the_same() {
    assert!(identity(1).same_person(&identity(1)));
  }

  #[test]
  fn any_single_shared_attribute_is_enough() {
    let base = identity(1);
    let other = identity(2);

    let shared: Vec<Box<dyn Fn(&mut Identity)>> = vec![
      Box::new(|i: &mut Identity| i.email = "user1@example.com".into()),
      Box::new(|i: &mut Identity| i.chat_id = "U1".into()),
      Box::new(|i: &mut Identity| i.chat_name = "chat1".into()),
      Box::new(|i: &mut Identity| i.source_id = 1),
      Box::new(|i: &mut Identity| i.source_username = "user1".into()),
    ];

    for apply in shared {
      let mut candidate = other.clone();
      apply(&mut candidate);
      assert!(base.same_person(&candidate), "{candidate:?}");
      assert!(candidate.same_person(&base), "{candidate:?}");
    }
  }

  #[test]
  fn link_takes_fields_from_both_accounts() {
    let source = SourceAccount {
      email:    "a@x".into(),
      id:       7,
      username: "alice".into(),
    };
    let chat = ChatAccount {
      email: "a@x".into(),
      id:    "C1".into(),
      name:  "alice.s".into(),
    };
    let linked = Identity::link(&source, &chat);
    assert_eq!(linked.email, "a@x");
    assert_eq!(linked.chat_id, "C1");
    assert_eq!(linked.chat_name, "alice.s");
    assert_eq!(linked.source_id, 7);
    assert_eq!(linked.source_username, "alice");
  }
}
