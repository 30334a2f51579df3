use std::{
    collections::HashSet,
    ffi::OsString,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use notify::{
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
    event::{ModifyKind, RenameMode},
    recommended_watcher,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Represents a file system event for a watched file.
#[derive(Debug, Clone)]
pub struct FileEvent {
    /// The path of the file that changed
    pub path: PathBuf,
    /// The type of change that occurred
    pub kind: FileEventKind,
}

/// The type of file system change that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    /// File contents were written
    Write,
    /// File was created
    Create,
    /// File was removed
    Remove,
    /// File was renamed away or replaced by a rename
    Rename,
    /// File permissions or other metadata changed
    Chmod,
}

impl FileEventKind {
    fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Create),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(Self::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(Self::Chmod),
            EventKind::Modify(_) => Some(Self::Write),
            EventKind::Remove(_) => Some(Self::Remove),
            _ => None,
        }
    }
}

/// A watched file, identified by its canonical directory and file name so
/// that events for a replaced file still match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WatchedFile {
    dir: PathBuf,
    name: OsString,
}

impl WatchedFile {
    fn matches(&self, path: &Path) -> bool {
        if path.file_name() != Some(self.name.as_os_str()) {
            return false;
        }

        path.parent()
            .and_then(|parent| parent.canonicalize().ok())
            .is_some_and(|parent| parent == self.dir)
    }
}

/// Cross-platform file system watcher for monitoring configuration files.
///
/// Watches the directory containing each file rather than the file itself,
/// so editors that save by writing a new file and renaming it over the old
/// one keep producing events. Only events for watched file names are
/// forwarded.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    watched_files: Arc<RwLock<HashSet<WatchedFile>>>,
}

impl FileWatcher {
    /// Creates a new file watcher and returns the watcher and event receiver.
    ///
    /// Uses an unbounded channel since file events are typically infrequent but bursty.
    ///
    /// # Errors
    /// Returns error if the underlying file system watcher cannot be initialized.
    pub fn new() -> Result<(Self, mpsc::UnboundedReceiver<FileEvent>), notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let watched_files: Arc<RwLock<HashSet<WatchedFile>>> = Arc::default();
        let filter = Arc::clone(&watched_files);

        let watcher = recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "file watch error");
                    return;
                }
            };

            let Some(kind) = FileEventKind::from_notify(&event.kind) else {
                return;
            };

            let watched = filter.read().unwrap_or_else(PoisonError::into_inner);
            for path in event.paths {
                if watched.iter().any(|file| file.matches(&path)) {
                    debug!(path = %path.display(), ?kind, "watched file changed");
                    let _ = event_tx.send(FileEvent { path, kind });
                }
            }
        })?;

        Ok((
            Self {
                watcher,
                watched_files,
            },
            event_rx,
        ))
    }

    /// Adds a file to the watch list for monitoring changes.
    ///
    /// The file's directory is canonicalized to handle symlinks and relative
    /// paths. If the file is already being watched, this operation is a no-op.
    ///
    /// # Errors
    /// Returns error if the path cannot be canonicalized or the watcher fails to monitor it.
    pub fn watch_file(&mut self, path: impl AsRef<Path>) -> Result<(), notify::Error> {
        let file = Self::identify(path.as_ref())?;

        let mut watched = self
            .watched_files
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if watched.contains(&file) {
            return Ok(());
        }

        let dir_already_watched = watched.iter().any(|other| other.dir == file.dir);
        if !dir_already_watched {
            self.watcher.watch(&file.dir, RecursiveMode::NonRecursive)?;
        }

        watched.insert(file);

        Ok(())
    }

    fn identify(path: &Path) -> Result<WatchedFile, notify::Error> {
        let canonical = path.canonicalize()?;
        let name = canonical
            .file_name()
            .ok_or_else(|| notify::Error::path_not_found().add_path(canonical.clone()))?
            .to_os_string();
        let dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| notify::Error::path_not_found().add_path(canonical.clone()))?;

        Ok(WatchedFile { dir, name })
    }
}
