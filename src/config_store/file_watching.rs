use std::{
    sync::atomic::Ordering,
    time::Instant,
};

use futures::Stream;
use tokio::{sync::broadcast::error::RecvError, task};
use tracing::{debug, info, trace, warn};

use crate::source::{FileEvent, FileEventKind, FileWatcher};

use super::{ConfigError, ConfigStore, ReloadEvent};

impl ConfigStore {
    /// Starts monitoring the configuration file and invalidating the cache on writes.
    ///
    /// A background task re-reads the file on every write or create event
    /// and, for writes that pass the change gate, evicts the whole
    /// configuration cache and publishes a [`ReloadEvent`]. The task runs
    /// for the rest of the process. Calling this again on the same store is
    /// a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns error if no file is loaded or file watching cannot be initialized.
    pub async fn start_watching(&self) -> Result<(), ConfigError> {
        if self.watching.swap(true, Ordering::AcqRel) {
            debug!("configuration file is already being watched");
            return Ok(());
        }

        self.spawn_watch_task().inspect_err(|_| {
            self.watching.store(false, Ordering::Release);
        })
    }

    /// Whether [`ConfigStore::start_watching`] has been called successfully
    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::Acquire)
    }

    /// Creates a stream of cache invalidations caused by file changes
    pub fn subscribe(&self) -> impl Stream<Item = ReloadEvent> + use<> {
        let receiver = self.reload_sender.subscribe();

        futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "reload subscriber fell behind");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }

    fn spawn_watch_task(&self) -> Result<(), ConfigError> {
        let path = self
            .config_file()
            .ok_or_else(|| ConfigError::FileWatchError {
                path: self.read_source().config_dir().join(self.config_name()),
                details: "configuration file has not been loaded".to_string(),
            })?;

        let (mut watcher, mut event_rx) =
            FileWatcher::new().map_err(|e| ConfigError::FileWatcherInitError {
                details: e.to_string(),
            })?;

        watcher
            .watch_file(&path)
            .map_err(|e| ConfigError::FileWatchError {
                path: path.clone(),
                details: e.to_string(),
            })?;

        let store = self.clone();

        tokio::spawn(async move {
            let _watcher = watcher;

            while let Some(event) = event_rx.recv().await {
                let now = Instant::now();
                let store = store.clone();

                // Re-reading the file blocks and holds the source write lock.
                let handled =
                    task::spawn_blocking(move || store.handle_file_event(&event, now)).await;
                if let Err(e) = handled {
                    warn!(error = %e, "configuration change handler failed");
                }
            }

            debug!("configuration watch channel closed");
        });

        info!(path = %path.display(), "watching configuration file");

        Ok(())
    }

    /// Applies one file-system notification observed at `now`.
    ///
    /// Writes and creates re-read the file. Only writes can invalidate the
    /// cache, and only when the change gate is open. Returns the published
    /// event when the cache was invalidated.
    pub(crate) fn handle_file_event(&self, event: &FileEvent, now: Instant) -> Option<ReloadEvent> {
        if matches!(event.kind, FileEventKind::Write | FileEventKind::Create) {
            if let Err(e) = self.write_source().read_file() {
                warn!(path = %event.path.display(), error = %e, "failed to re-read configuration file");
            }
        }

        if event.kind != FileEventKind::Write {
            trace!(kind = ?event.kind, "change does not invalidate cache");
            return None;
        }

        let Some(evicted) = self.gate().admit_at(now, || self.clear_cache()) else {
            debug!(path = %event.path.display(), "duplicate change notification suppressed");
            return None;
        };

        let reload = ReloadEvent {
            path: event.path.clone(),
            evicted,
            timestamp: now,
        };

        info!(path = %reload.path.display(), evicted, "configuration changed, cache invalidated");
        let _ = self.reload_sender.send(reload.clone());

        Some(reload)
    }
}
