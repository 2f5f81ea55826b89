use crossbeam_channel::Sender;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Forwards file system events for watched pattern files to a channel.
/// notify runs its own background thread.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    /// Last contents evaluated per file, to skip duplicate events from a
    /// single save
    last_seen: HashMap<PathBuf, String>,
}

impl FileWatcher {
    /// Create a new file watcher that sends events to the provided channel
    pub fn new(tx: Sender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            // We ignore send errors because it means the receiver was dropped
            let _ = tx.send(res);
        })?;

        Ok(Self {
            watcher,
            last_seen: HashMap::new(),
        })
    }

    /// Add a path to be watched. Returns the canonical path, which is the
    /// key for every later call about this file.
    pub fn watch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<PathBuf> {
        let path = canonical(path.as_ref())?;
        self.watcher.watch(&path, RecursiveMode::NonRecursive)?;
        Ok(path)
    }

    /// Remove a path from being watched, returning its canonical form
    pub fn unwatch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<PathBuf> {
        let path = canonical(path.as_ref())?;
        self.last_seen.remove(&path);
        self.watcher.unwatch(&path)?;
        Ok(path)
    }

    /// Record `contents` for `path`; false if they match the last revision
    pub fn is_new_revision(&mut self, path: &Path, contents: &str) -> bool {
        if self.last_seen.get(path).is_some_and(|last| last == contents) {
            return false;
        }
        self.last_seen.insert(path.to_path_buf(), contents.to_string());
        true
    }
}

/// Absolute path with `.`, `..` and symlinks resolved
pub fn canonical(path: &Path) -> notify::Result<PathBuf> {
    std::fs::canonicalize(path).map_err(notify::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_duplicate_revisions_are_skipped() {
        let (tx, _rx) = unbounded();
        let mut watcher = FileWatcher::new(tx).unwrap();
        let path = Path::new("beat.strand");

        assert!(watcher.is_new_revision(path, "bd sn"));
        assert!(!watcher.is_new_revision(path, "bd sn"));
        assert!(watcher.is_new_revision(path, "bd hh"));
        assert!(watcher.is_new_revision(Path::new("other.strand"), "bd hh"));
    }

    fn scratch_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("strand-{}-{}", std::process::id(), name));
        std::fs::write(&path, "bd sn").unwrap();
        path
    }

    #[test]
    fn test_spellings_of_one_file_share_a_key() {
        let path = scratch_file("key.strand");
        let dir = path.parent().unwrap();
        let name = path.file_name().unwrap();
        let dotted = dir.join(".").join(name);
        let dir_name = dir.file_name().unwrap();
        let up_and_back = dir.join("..").join(dir_name).join(name);

        let key = canonical(&path).unwrap();
        assert!(key.is_absolute());
        assert_eq!(canonical(&dotted).unwrap(), key);
        assert_eq!(canonical(&up_and_back).unwrap(), key);

        std::fs::remove_file(&path).unwrap();
        assert!(canonical(&path).is_err());
    }

    #[test]
    fn test_watch_and_unwatch_use_canonical_paths() {
        let path = scratch_file("watch.strand");
        let dotted = path.parent().unwrap().join(".").join(path.file_name().unwrap());
        let (tx, _rx) = unbounded();
        let mut watcher = FileWatcher::new(tx).unwrap();

        let key = watcher.watch(&dotted).unwrap();
        assert_eq!(key, canonical(&path).unwrap());
        assert!(watcher.is_new_revision(&key, "bd sn"));
        assert!(!watcher.is_new_revision(&key, "bd sn"));

        // Unwatching by another spelling forgets the last revision
        assert_eq!(watcher.unwatch(&path).unwrap(), key);
        assert!(watcher.is_new_revision(&key, "bd sn"));

        std::fs::remove_file(&path).unwrap();
    }
}
