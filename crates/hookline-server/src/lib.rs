//! HTTP layer for hookline.
//!
//! Exposes an axum [`Router`] that accepts GitLab webhooks, runs them through
//! the decision engine in `hookline-core`, and queues the resulting Slack
//! messages on the [`dispatch`] gate.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod refresh;

pub use error::Error;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use hookline_core::{directory::Directory, recipients::ActiveRecipients};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use auth::AuthConfig;
use dispatch::Dispatcher;

/// Upper bound on reading a request and producing its response. A request
/// still unfinished after this gets `408 Request Timeout`.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub directory:  Arc<Directory>,
  pub recipients: Arc<ActiveRecipients>,
  pub dispatcher: Dispatcher,
  pub auth:       Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the webhook [`Router`].
///
/// | Method | Path        | Auth |
/// |--------|-------------|------|
/// | `POST` | `/comments` | yes  |
/// | `POST` | `/pipeline` | yes  |
/// | `GET`  | `/healthz`  | no   |
///
/// Every route is bounded by [`REQUEST_TIMEOUT`].
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/comments", post(handlers::comments::handler))
    .route("/pipeline", post(handlers::pipeline::handler))
    .route("/healthz",  get(handlers::health::handler))
    .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Install aws-lc-rs as the process-wide rustls provider.
///
/// Returns `false` when a provider was already installed; that one is kept.
pub fn install_crypto_provider() -> bool {
  match rustls::crypto::aws_lc_rs::default_provider().install_default() {
    Ok(()) => true,
    Err(_) => {
      tracing::warn!("a rustls crypto provider is already installed, keeping it");
      false
    }
  }
}
