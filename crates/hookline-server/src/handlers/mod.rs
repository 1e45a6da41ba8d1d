pub mod comments;
pub mod health;
pub mod pipeline;

use axum::body::Bytes;
use hookline_core::{decision::Decision, event::WebhookEvent};

use crate::{AppState, error::Error};

/// Decode a webhook body. An empty body is a bad request; anything that is
/// not JSON is a decode error.
pub(crate) fn decode(body: &Bytes) -> Result<WebhookEvent, Error> {
  if body.is_empty() {
    return Err(Error::EmptyBody);
  }
  WebhookEvent::from_json(body).map_err(Error::from)
}

/// Hand a notification to the dispatch gate; suppressions are only logged.
pub(crate) fn hand_off(state: &AppState, decision: Decision) {
  match decision {
    Decision::Notify(notification) => {
      tracing::info!(recipient = %notification.recipient, text = %notification.text, "sending slack message");
      state.dispatcher.dispatch(notification);
    }
    Decision::Suppress(reason) => tracing::debug!(?reason, "notification suppressed"),
  }
}
