//! hookline server binary.
//!
//! Reads `hookline.toml` (or the path given with `--config`) and the process
//! environment, links GitLab and Slack users, and serves the webhook
//! endpoints over HTTP, or HTTPS when both TLS files are present.

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use hookline_clients::{GitlabClient, SlackClient};
use hookline_core::directory::Directory;
use hookline_server::{
  AppState, auth::AuthConfig, config::ServerConfig, dispatch, refresh,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(author, version, about = "Relay GitLab comments and failed pipelines to Slack")]
struct Cli {
  /// Path to the optional TOML configuration file.
  #[arg(short, long, default_value = "hookline.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  // Required before rustls builds any client or server config.
  hookline_server::install_crypto_provider();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config).context("failed to read configuration")?;
  let recipients = cfg.validate().context("invalid configuration")?;
  tracing::info!(active = ?recipients.usernames(), "loaded active users");

  let gitlab = GitlabClient::new(&cfg.gitlab_url, &cfg.gitlab_token)
    .context("failed to build gitlab client")?;
  let slack = SlackClient::new(&cfg.slack_api_url, &cfg.slack_token, &cfg.bot_name)
    .context("failed to build slack client")?;

  let directory = Arc::new(Directory::new());
  let (dispatcher, queue) = dispatch::Dispatcher::channel(cfg.dispatch_queue_capacity);
  dispatch::spawn_delivery(queue, slack.clone());
  let scheduler = refresh::spawn_scheduler(
    Arc::clone(&directory),
    Arc::new(gitlab),
    Arc::new(slack),
    cfg.refresh_interval(),
  );

  let state = AppState {
    directory,
    recipients: Arc::new(recipients),
    dispatcher,
    auth: Arc::new(AuthConfig { secret_token: cfg.secret_token.clone() }),
  };
  let app = hookline_server::router(state).into_make_service();

  let address: SocketAddr = cfg
    .listen_addr
    .parse()
    .with_context(|| format!("invalid listen address {:?}", cfg.listen_addr))?;

  let handle = Handle::new();
  tokio::spawn(shutdown_on_signal(handle.clone()));

  let served = match cfg.tls_paths() {
    Some((cert, key)) => {
      let tls = RustlsConfig::from_pem_file(&cert, &key)
        .await
        .with_context(|| format!("failed to load TLS files {cert:?} / {key:?}"))?;
      tracing::info!("Listening on https://{address}");
      axum_server::bind_rustls(address, tls).handle(handle).serve(app).await
    }
    None => {
      tracing::info!("Listening on http://{address}");
      axum_server::bind(address).handle(handle).serve(app).await
    }
  };

  scheduler.abort();
  served.context("server error")?;
  tracing::info!("stopped");
  Ok(())
}

/// Close the listener on Ctrl-C or SIGTERM.
async fn shutdown_on_signal(handle: Handle) {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }

  tracing::info!("shutdown signal received");
  handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
