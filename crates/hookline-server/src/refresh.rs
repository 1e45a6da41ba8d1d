//! Periodic rebuild of the identity directory.

use std::{sync::Arc, time::Duration};

use hookline_core::{
  directory::Directory,
  ports::{ChatDirectory, SourceDirectory},
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Refresh `directory` now and then every `every` until the handle is
/// aborted.
///
/// Each tick runs its refresh on a separate task, so a slow upstream never
/// delays the schedule. Two refreshes may overlap; each one only publishes a
/// complete snapshot, so the last to finish wins.
pub fn spawn_scheduler<G, C>(
  directory: Arc<Directory>,
  source: Arc<G>,
  chat: Arc<C>,
  every: Duration,
) -> JoinHandle<()>
where
  G: SourceDirectory + 'static,
  C: ChatDirectory + 'static,
{
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      // The first tick completes immediately.
      ticker.tick().await;
      let directory = Arc::clone(&directory);
      let source = Arc::clone(&source);
      let chat = Arc::clone(&chat);
      tokio::spawn(async move {
        directory.refresh(source.as_ref(), chat.as_ref()).await;
      });
    }
  })
}
