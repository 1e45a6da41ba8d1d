//! Fire-and-forget delivery of notifications to Slack.
//!
//! Handlers push onto a bounded queue and return immediately. A single
//! background worker drains the queue through a [`ChatSender`]. Nothing that
//! happens after the push, including a failed post, reaches the webhook
//! caller.

use hookline_core::{decision::Notification, ports::ChatSender};
use tokio::{
  sync::mpsc::{self, Receiver, Sender, error::TrySendError},
  task::JoinHandle,
};

/// Producer side of the delivery queue. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Dispatcher {
  tx: Sender<Notification>,
}

impl Dispatcher {
  /// Create a queue holding at most `capacity` undelivered notifications.
  pub fn channel(capacity: usize) -> (Self, Receiver<Notification>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Self { tx }, rx)
  }

  /// Queue `notification` without waiting. A full or closed queue drops it.
  pub fn dispatch(&self, notification: Notification) {
    match self.tx.try_send(notification) {
      Ok(()) => tracing::debug!("notification queued"),
      Err(TrySendError::Full(n)) => tracing::warn!(
        recipient = %n.recipient,
        "delivery queue full, dropping notification"
      ),
      Err(TrySendError::Closed(n)) => tracing::error!(
        recipient = %n.recipient,
        "delivery worker is gone, dropping notification"
      ),
    }
  }
}

/// Post every queued notification until all [`Dispatcher`]s are dropped.
///
/// Failures are logged and the notification is discarded; there is no retry.
pub async fn run_delivery<C>(mut rx: Receiver<Notification>, sender: C)
where
  C: ChatSender,
{
  while let Some(n) = rx.recv().await {
    match sender
      .post_message(&n.recipient, &n.text, n.attachment.as_deref())
      .await
    {
      Ok(()) => tracing::info!(recipient = %n.recipient, "notification delivered"),
      Err(e) => tracing::error!(
        recipient = %n.recipient,
        error = %e,
        "notification delivery failed"
      ),
    }
  }
  tracing::debug!("delivery queue closed");
}

/// Run [`run_delivery`] on its own task.
pub fn spawn_delivery<C>(rx: Receiver<Notification>, sender: C) -> JoinHandle<()>
where
  C: ChatSender + 'static,
{
  tokio::spawn(run_delivery(rx, sender))
}
