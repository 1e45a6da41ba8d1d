//! Runtime configuration, read once at startup.
//!
//! Values come from an optional TOML file overlaid by environment variables.
//! Keys are the lower-cased variable names, so `SECRET_TOKEN` and
//! `secret_token = "…"` in the file set the same field.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use hookline_core::recipients::ActiveRecipients;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("{0} must not be empty")]
  Missing(&'static str),
  #[error("{0} must be greater than zero")]
  Zero(&'static str),
  #[error("{0} is too large")]
  TooLarge(&'static str),
  #[error("ACTIVE_USERS: {0}")]
  Recipients(#[from] hookline_core::Error),
}

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  /// Shared secret GitLab sends in `X-Gitlab-Token`.
  #[serde(default)]
  pub secret_token:             String,
  #[serde(default)]
  pub slack_token:              String,
  #[serde(default)]
  pub gitlab_token:             String,
  /// Comma-separated GitLab usernames allowed to receive notifications.
  #[serde(default)]
  pub active_users:             String,
  #[serde(default = "default_bot_name")]
  pub bot_name:                 String,
  #[serde(default = "default_gitlab_url")]
  pub gitlab_url:               String,
  #[serde(default = "default_slack_api_url")]
  pub slack_api_url:            String,
  #[serde(default = "default_listen_addr")]
  pub listen_addr:              String,
  #[serde(default = "default_refresh_interval_minutes")]
  pub refresh_interval_minutes: u64,
  #[serde(default = "default_dispatch_queue_capacity")]
  pub dispatch_queue_capacity:  usize,
  pub ssl_key_path:             Option<PathBuf>,
  pub ssl_cert_path:            Option<PathBuf>,
}

fn default_bot_name() -> String { "hookline".to_string() }

fn default_gitlab_url() -> String { "https://gitlab.com/api/v4".to_string() }

fn default_slack_api_url() -> String { "https://slack.com/api".to_string() }

fn default_listen_addr() -> String { "0.0.0.0:9090".to_string() }

fn default_refresh_interval_minutes() -> u64 { 180 }

fn default_dispatch_queue_capacity() -> usize { 256 }

impl ServerConfig {
  /// Read `file` (if it exists) and then the process environment.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::default())
      .build()?
      .try_deserialize()
  }

  /// Check the values the relay cannot run without and build the
  /// allow-list.
  pub fn validate(&self) -> Result<ActiveRecipients, ConfigError> {
    let required = [
      ("SECRET_TOKEN", &self.secret_token),
      ("SLACK_TOKEN", &self.slack_token),
      ("GITLAB_TOKEN", &self.gitlab_token),
      ("ACTIVE_USERS", &self.active_users),
    ];
    if let Some((name, _)) = required.iter().find(|(_, v)| v.is_empty()) {
      return Err(ConfigError::Missing(*name));
    }
    if self.refresh_interval_minutes == 0 {
      return Err(ConfigError::Zero("REFRESH_INTERVAL_MINUTES"));
    }
    if self.refresh_interval_minutes.checked_mul(60).is_none() {
      return Err(ConfigError::TooLarge("REFRESH_INTERVAL_MINUTES"));
    }
    if self.dispatch_queue_capacity == 0 {
      return Err(ConfigError::Zero("DISPATCH_QUEUE_CAPACITY"));
    }
    Ok(ActiveRecipients::parse(&self.active_users)?)
  }

  /// Saturates for values [`validate`](Self::validate) rejects.
  pub fn refresh_interval(&self) -> Duration {
    Duration::from_secs(self.refresh_interval_minutes.saturating_mul(60))
  }

  /// `(cert, key)` when both are configured and present on disk.
  ///
  /// Anything less falls back to plaintext with a warning.
  pub fn tls_paths(&self) -> Option<(PathBuf, PathBuf)> {
    let key = existing(self.ssl_key_path.as_deref(), "ssl key");
    let cert = existing(self.ssl_cert_path.as_deref(), "ssl certificate");
    Some((cert?, key?))
  }
}

fn existing(path: Option<&Path>, what: &str) -> Option<PathBuf> {
  match path {
    Some(p) if p.is_file() => Some(p.to_path_buf()),
    Some(p) => {
      tracing::warn!(path = %p.display(), "unable to find {what}");
      None
    }
    None => {
      tracing::warn!("no {what} configured");
      None
    }
  }
}
