//! GitLab webhook payloads and the classifier that routes them.
//!
//! Only the fields the relay acts on are decoded; everything else in the
//! payload is ignored. Every field is optional so that a missing block shows
//! up as a classification failure rather than a decode error.

use serde::{Deserialize, Deserializer};

use crate::Result;

/// `object_kind` of a note (comment) event.
pub const COMMENT_KIND: &str = "note";
/// `object_kind` of a pipeline event.
pub const PIPELINE_KIND: &str = "pipeline";
/// Pipeline status that triggers a notification.
pub const FAILED_STATUS: &str = "failed";

// ─── Payload ─────────────────────────────────────────────────────────────────

/// A decoded webhook body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
  #[serde(default, deserialize_with = "null_as_empty")]
  pub object_kind:       String,
  pub project:           Option<Project>,
  pub object_attributes: Option<ObjectAttributes>,
  pub merge_request:     Option<MergeRequest>,
  pub commit:            Option<Commit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Project {
  #[serde(default, deserialize_with = "null_as_empty")]
  pub name: String,
}

/// The attribution block. For notes it describes the comment, for pipelines
/// the run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectAttributes {
  pub author_id: Option<u64>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub note:      String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub url:       String,
  pub status:    Option<String>,
  #[serde(rename = "ref")]
  pub git_ref:   Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MergeRequest {
  pub author_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Commit {
  #[serde(default, deserialize_with = "null_as_empty")]
  pub url:    String,
  pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitAuthor {
  #[serde(default, deserialize_with = "null_as_empty")]
  pub email: String,
}

/// GitLab sends `null` for some absent strings; treat it like a missing key.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ─── Classification ──────────────────────────────────────────────────────────

impl WebhookEvent {
  /// Decode a raw request body.
  pub fn from_json(body: &[u8]) -> Result<Self> { Ok(serde_json::from_slice(body)?) }

  pub fn is_comment_event(&self) -> bool { self.object_kind == COMMENT_KIND }

  pub fn is_pipeline_event(&self) -> bool { self.object_kind == PIPELINE_KIND }

  /// The attribution block is present, together with either a merge request
  /// or a commit reference.
  pub fn is_structurally_valid(&self) -> bool {
    self.object_attributes.is_some()
      && (self.merge_request.is_some() || self.commit.is_some())
  }

  /// The pipeline status is exactly `"failed"`.
  pub fn is_terminal_failure(&self) -> bool {
    self
      .object_attributes
      .as_ref()
      .and_then(|a| a.status.as_deref())
      == Some(FAILED_STATUS)
  }

  /// Email of the commit author, if the payload names one.
  pub fn commit_author_email(&self) -> Option<&str> {
    self
      .commit
      .as_ref()
      .and_then(|c| c.author.as_ref())
      .map(|a| a.email.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn decode(value: serde_json::Value) -> WebhookEvent {
    WebhookEvent::from_json(value.to_string().as_bytes()).unwrap()
  }

  #[test]
  fn classifies_by_object_kind() {
    let note = decode(json!({ "object_kind": "note" }));
    assert!(note.is_comment_event());
    assert!(!note.is_pipeline_event());

    let pipeline = decode(json!({ "object_kind": "pipeline" }));
    assert!(pipeline.is_pipeline_event());
    assert!(!pipeline.is_comment_event());

    let push = decode(json!({ "object_kind": "push" }));
    assert!(!push.is_comment_event() && !push.is_pipeline_event());
  }

  #[test]
  fn validity_needs_attributes_and_a_reference() {
    let attrs_only = decode(json!({ "object_kind": "note", "object_attributes": {} }));
    assert!(!attrs_only.is_structurally_valid());

    let with_mr = decode(json!({
      "object_kind": "note",
      "object_attributes": {},
      "merge_request": { "author_id": 2 }
    }));
    assert!(with_mr.is_structurally_valid());

    let with_commit = decode(json!({
      "object_kind": "note",
      "object_attributes": {},
      "commit": { "url": "http://example.com/c/1" }
    }));
    assert!(with_commit.is_structurally_valid());

    let no_attrs = decode(json!({ "object_kind": "note", "commit": {} }));
    assert!(!no_attrs.is_structurally_valid());
  }

  #[test]
  fn only_exact_failed_status_is_terminal_failure() {
    for status in ["running", "success", "pending", "Failed", "FAILED", ""] {
      let event = decode(json!({
        "object_kind": "pipeline",
        "object_attributes": { "status": status }
      }));
      assert!(!event.is_terminal_failure(), "{status}");
    }

    let missing = decode(json!({ "object_kind": "pipeline", "object_attributes": {} }));
    assert!(!missing.is_terminal_failure());

    let failed = decode(json!({
      "object_kind": "pipeline",
      "object_attributes": { "status": "failed" }
    }));
    assert!(failed.is_terminal_failure());
  }

  #[test]
  fn decodes_gitlab_note_payload_and_ignores_unknown_fields() {
    let event = decode(json!({
      "object_kind": "note",
      "user": { "name": "Administrator", "username": "root" },
      "project_id": 10,
      "project": { "name": "Gitlab Test", "web_url": "http://example.com/gitlab-org/gitlab-test" },
      "object_attributes": {
        "id": 1243,
        "note": "This is a commit comment. How does this work?",
        "noteable_type": "Commit",
        "author_id": 2,
        "st_diff": { "diff": "--- /dev/null\n+++ b/six\n" },
        "url": "http://example.com/gitlab-org/gitlab-test/commit/cfe32cf#note_1243"
      },
      "commit": {
        "id": "cfe32cf61b73a0d5e9f13e774abde7ff789b1660",
        "url": "http://example.com/gitlab-org/gitlab-test/commit/cfe32cf",
        "author": { "name": "Stephen", "email": "stephen1@example.com" }
      }
    }));

    let attrs = event.object_attributes.as_ref().unwrap();
    assert_eq!(attrs.author_id, Some(2));
    assert_eq!(attrs.note, "This is a commit comment. How does this work?");
    assert_eq!(event.commit_author_email(), Some("stephen1@example.com"));
    assert_eq!(event.project.unwrap().name, "Gitlab Test");
  }

  #[test]
  fn decodes_pipeline_ref() {
    let event = decode(json!({
      "object_kind": "pipeline",
      "object_attributes": { "status": "failed", "ref": "main" },
      "commit": { "url": "http://example.com/c/1" }
    }));
    assert_eq!(event.object_attributes.unwrap().git_ref.as_deref(), Some("main"));
  }

  #[test]
  fn malformed_json_is_a_decode_error() {
    let err = WebhookEvent::from_json(b"{ not json").unwrap_err();
    assert!(matches!(err, crate::Error::Decode(_)));
  }

  #[test]
  fn null_strings_decode_as_empty() {
    let event = decode(json!({
      "object_kind": "note",
      "project": { "name": null },
      "object_attributes": { "author_id": 2, "note": null, "url": null },
      "commit": { "url": null, "author": { "email": null } }
    }));
    let attrs = event.object_attributes.as_ref().unwrap();
    assert_eq!(attrs.note, "");
    assert_eq!(attrs.url, "");
    assert_eq!(event.commit_author_email(), Some(""));
    assert_eq!(event.project.as_ref().unwrap().name, "");

    let kindless = decode(json!({ "object_kind": null }));
    assert!(!kindless.is_comment_event() && !kindless.is_pipeline_event());
  }

  #[test]
  fn null_blocks_decode_as_absent() {
    let event = decode(json!({
      "object_kind": "note",
      "object_attributes": null,
      "merge_request": null,
      "commit": null
    }));
    assert!(!event.is_structurally_valid());
  }
}
