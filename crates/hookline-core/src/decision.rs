//! Turning a classified event into a notification decision.
//!
//! Both entry points read the directory through [`IdentityLookup`] and never
//! mutate anything. Suppression is a successful outcome; only a rejected
//! event or a correlation gap is an error.

use crate::{
  Error, Result,
  directory::IdentityLookup,
  error::Role,
  event::WebhookEvent,
  identity::Identity,
  recipients::ActiveRecipients,
};

// ─── Decision types ──────────────────────────────────────────────────────────

/// A message ready to hand to the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  /// Chat-platform ID of the person being notified.
  pub recipient:  String,
  pub text:       String,
  pub attachment: Option<String>,
}

/// Why no message was produced for an otherwise valid event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
  /// The code owner is not on the allow-list.
  InactiveRecipient,
  /// The commenter is the code owner.
  SelfComment,
  /// The pipeline has not reached the failed state.
  PipelineNotFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
  Notify(Notification),
  Suppress(SuppressReason),
}

// ─── Comment events ──────────────────────────────────────────────────────────

/// Decide what to do with a note event.
///
/// The code owner is the merge request author when the note is on a merge
/// request, otherwise the author of the commented commit.
pub fn decide_comment<L>(
  event: &WebhookEvent,
  lookup: &L,
  recipients: &ActiveRecipients,
) -> Result<Decision>
where
  L: IdentityLookup + ?Sized,
{
  if !event.is_comment_event() || !event.is_structurally_valid() {
    return Err(Error::Rejected("not valid or not a comment request"));
  }
  let Some(attrs) = event.object_attributes.as_ref() else {
    return Err(Error::Rejected("missing object attributes"));
  };

  let code_owner = match &event.merge_request {
    Some(mr) => mr.author_id.and_then(|id| lookup.by_review_author(id)),
    None => event
      .commit_author_email()
      .and_then(|email| lookup.by_commit_author(email)),
  }
  .ok_or(Error::UserDiscovery(Role::CodeOwner))?;

  let commenter = attrs
    .author_id
    .and_then(|id| lookup.by_comment_author(id))
    .ok_or(Error::UserDiscovery(Role::Commenter))?;

  tracing::info!(
    commenter = %commenter.source_username,
    code_owner = %code_owner.source_username,
    "comment on merge request or commit"
  );

  if let Some(reason) = suppress_comment(code_owner, commenter, recipients) {
    tracing::info!(?reason, "ignoring the comment");
    return Ok(Decision::Suppress(reason));
  }

  let text = format!(
    "{} made a comment on your <{}|Merge Request>",
    commenter.source_username, attrs.url
  );
  let attachment = Some(attrs.note.clone()).filter(|n| !n.is_empty());

  Ok(Decision::Notify(Notification {
    recipient: code_owner.chat_id.clone(),
    text,
    attachment,
  }))
}

fn suppress_comment(
  code_owner: &Identity,
  commenter: &Identity,
  recipients: &ActiveRecipients,
) -> Option<SuppressReason> {
  if !recipients.is_active(code_owner) {
    Some(SuppressReason::InactiveRecipient)
  } else if code_owner.same_person(commenter) {
    Some(SuppressReason::SelfComment)
  } else {
    None
  }
}

// ─── Pipeline events ─────────────────────────────────────────────────────────

/// Decide what to do with a pipeline event.
///
/// Anything but a failed pipeline is suppressed before the directory is
/// consulted.
pub fn decide_pipeline<L>(
  event: &WebhookEvent,
  lookup: &L,
  recipients: &ActiveRecipients,
) -> Result<Decision>
where
  L: IdentityLookup + ?Sized,
{
  if !event.is_pipeline_event() || !event.is_structurally_valid() {
    return Err(Error::Rejected("not valid or not a pipeline request"));
  }
  let Some(commit) = event.commit.as_ref() else {
    return Err(Error::Rejected("pipeline request without a commit"));
  };

  if !event.is_terminal_failure() {
    return Ok(Decision::Suppress(SuppressReason::PipelineNotFailed));
  }

  let code_owner = event
    .commit_author_email()
    .and_then(|email| lookup.by_commit_author(email))
    .ok_or(Error::UserDiscovery(Role::CodeOwner))?;

  if !recipients.is_active(code_owner) {
    tracing::info!(
      code_owner = %code_owner.source_username,
      "ignoring failed pipeline for inactive user"
    );
    return Ok(Decision::Suppress(SuppressReason::InactiveRecipient));
  }

  let mut text = format!("Pipeline failed for your <{}|Commit>", commit.url);
  let git_ref = event
    .object_attributes
    .as_ref()
    .and_then(|a| a.git_ref.as_deref());
  if let (Some(project), Some(git_ref)) = (&event.project, git_ref) {
    text.push_str(&format!(" ({}/{})", project.name, git_ref));
  }

  Ok(Decision::Notify(Notification {
    recipient:  code_owner.chat_id.clone(),
    text,
    attachment: None,
  }))
}
