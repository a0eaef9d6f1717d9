use crate::api::Transport;
use crate::error::{Result, SyncError};
use crate::sync::{Outcome, ReconciliationEngine};
use crate::zone::constants::ZONE_FILE_SUFFIX;
use notify::event::{AccessKind, AccessMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Watches a directory for zone files that were closed after writing
///
/// Paths are forwarded in the order the OS reports them. Dropping the
/// watcher stops notifications and closes the channel.
pub struct ZoneWatcher {
    _watcher: RecommendedWatcher,
    dir: PathBuf,
}

impl ZoneWatcher {
    /// Start watching `dir` (non-recursively)
    pub fn start<P: AsRef<Path>>(dir: P) -> Result<(Self, mpsc::UnboundedReceiver<PathBuf>)> {
        let dir = dir.as_ref().to_path_buf();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher: RecommendedWatcher = Watcher::new(
            move |result: std::result::Result<Event, notify::Error>| match result {
                Ok(event) => {
                    for path in zone_paths(&event) {
                        if let Err(e) = tx.send(path) {
                            error!("Failed to send zone change event: {}", e);
                        }
                    }
                }
                Err(e) => error!("File watch error: {}", e),
            },
            notify::Config::default(),
        )
        .map_err(|e| SyncError::Io(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| SyncError::Io(format!("Failed to watch {}: {}", dir.display(), e)))?;

        info!("Watching {} for zone file changes", dir.display());

        Ok((
            Self {
                _watcher: watcher,
                dir,
            },
            rx,
        ))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Zone file paths carried by a close-after-write event
fn zone_paths(event: &Event) -> Vec<PathBuf> {
    if !matches!(
        event.kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
    ) {
        return Vec::new();
    }

    event
        .paths
        .iter()
        .filter(|path| is_zone_file(path))
        .cloned()
        .collect()
}

/// `<domain>.db`
pub fn is_zone_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(ZONE_FILE_SUFFIX))
        .is_some_and(|domain| !domain.is_empty())
}

/// Feed every received path through the engine, one at a time
///
/// Each event runs to completion before the next is taken. A failed event
/// is logged by the engine and does not stop the loop; the loop ends only
/// when the sending side is dropped. Returns the number of events handled.
pub async fn run<T: Transport>(
    engine: &ReconciliationEngine<T>,
    mut events: mpsc::UnboundedReceiver<PathBuf>,
) -> usize {
    let mut handled = 0;

    while let Some(path) = events.recv().await {
        if !is_zone_file(&path) {
            debug!("Ignoring non-zone file {}", path.display());
            continue;
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Detected change in: {}", file_name);

        let outcome: Outcome = engine.process(&path).await;
        debug!("{}", outcome);
        handled += 1;
    }

    info!("Change stream closed after {} events", handled);
    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    #[test]
    fn test_is_zone_file() {
        assert!(is_zone_file(Path::new("/var/named/example.com.db")));
        assert!(!is_zone_file(Path::new("/var/named/example.com.db~")));
        assert!(!is_zone_file(Path::new("/var/named/named.conf")));
        assert!(!is_zone_file(Path::new("/var/named/.db")));
    }

    #[test]
    fn test_close_write_events_are_forwarded() {
        let paths = zone_paths(&event(
            EventKind::Access(AccessKind::Close(AccessMode::Write)),
            &["/var/named/example.com.db", "/var/named/notes.txt"],
        ));
        assert_eq!(paths, vec![PathBuf::from("/var/named/example.com.db")]);
    }

    #[test]
    fn test_other_events_are_ignored() {
        for kind in [
            EventKind::Create(CreateKind::File),
            EventKind::Modify(ModifyKind::Any),
            EventKind::Access(AccessKind::Close(AccessMode::Read)),
        ] {
            assert!(zone_paths(&event(kind, &["/var/named/example.com.db"])).is_empty());
        }
    }
}
