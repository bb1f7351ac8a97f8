//! Per-channel append-only log files.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Render one on-disk log line (without the trailing newline).
///
/// The shape `[stamp]author : text` is load-bearing: the catch-up scanner
/// extracts the bracketed stamp back out of it, and existing deployments have
/// logs written this way.
pub fn format_line(timestamp: &str, author: &str, text: &str) -> String {
    format!("[{timestamp}]{author} : {text}")
}

/// Append-only log files, one per channel, under a single root directory.
///
/// Writes to the same channel are serialized by a per-channel mutex, and reads
/// of a channel take the same mutex so they never observe a half-written line.
/// Unrelated channels do not contend. Single process only; there is no
/// cross-process file locking.
#[derive(Debug)]
pub struct ChannelLogStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChannelLogStore {
    /// Open the store, creating `root` if it does not exist yet. A root that
    /// cannot be created is fatal to startup.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| Error::Startup {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            locks: Mutex::new(HashMap::new()),
        })
    }

    fn log_path(&self, channel: &str) -> PathBuf {
        self.root.join(format!("{channel}.log"))
    }

    fn channel_lock(&self, channel: &str) -> Arc<Mutex<()>> {
        let mut locks = lock_unpoisoned(&self.locks);
        locks
            .entry(channel.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Append one entry to a channel's log, creating the file on first use.
    /// The write is flushed before returning.
    pub fn append(&self, channel: &str, author: &str, text: &str, timestamp: &str) -> Result<()> {
        let lock = self.channel_lock(channel);
        let _guard = lock_unpoisoned(&lock);

        let into_error = |source| Error::Append {
            channel: channel.to_string(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(channel))
            .map_err(into_error)?;
        file.write_all(format!("{}\n", format_line(timestamp, author, text)).as_bytes())
            .and_then(|()| file.flush())
            .map_err(into_error)
    }

    /// Last `count` lines of a channel's log, oldest first.
    ///
    /// A channel that has never been written, or a `count` of zero, yields an
    /// empty vector; a `count` past the start of the log yields the whole log.
    pub fn tail(&self, channel: &str, count: usize) -> Result<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let Some(lines) = self.read_lines(channel)? else {
            return Ok(Vec::new());
        };
        let start = lines.len().saturating_sub(count);
        Ok(lines[start..].to_vec())
    }

    /// Lines of a channel's log from newest to oldest.
    ///
    /// Returns `None` when the channel has never been written, so callers can
    /// tell "no log" apart from "empty log". The iterator is finite and
    /// one-shot; call again to rescan.
    pub fn scan_reverse(&self, channel: &str) -> Result<Option<impl Iterator<Item = String>>> {
        Ok(self.read_lines(channel)?.map(|lines| lines.into_iter().rev()))
    }

    /// Whole log of a channel, or `None` if it was never written.
    fn read_lines(&self, channel: &str) -> Result<Option<Vec<String>>> {
        let lock = self.channel_lock(channel);
        let _guard = lock_unpoisoned(&lock);

        match std::fs::read_to_string(self.log_path(channel)) {
            Ok(raw) => Ok(Some(raw.lines().map(str::to_string).collect())),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(source.into()),
        }
    }
}

/// Lock a mutex, recovering the guard if a previous holder panicked. The
/// protected state is a plain `()` or a lock registry, so a poisoned guard is
/// still coherent.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ChannelLogStore) {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let store = ChannelLogStore::open(dir.path().join("logs")).expect("store should open");
        (dir, store)
    }

    fn seed_general(store: &ChannelLogStore) {
        store
            .append("general", "alice", "first", "2024-01-01 10:00:00")
            .expect("append should succeed");
        store
            .append("general", "bob", "second", "2024-01-01 10:05:00")
            .expect("append should succeed");
        store
            .append("general", "alice", "third", "2024-01-01 10:10:00")
            .expect("append should succeed");
    }

    #[test]
    fn append_then_tail_returns_newest_lines_in_order() {
        let (_dir, store) = store();
        seed_general(&store);

        let lines = store.tail("general", 2).expect("tail should succeed");
        assert_eq!(
            lines,
            vec![
                "[2024-01-01 10:05:00]bob : second",
                "[2024-01-01 10:10:00]alice : third",
            ]
        );
    }

    #[test]
    fn tail_is_read_only() {
        let (_dir, store) = store();
        seed_general(&store);

        let first = store.tail("general", 3).expect("tail should succeed");
        let second = store.tail("general", 3).expect("tail should succeed");
        assert_eq!(first, second);

        store
            .append("general", "carol", "fourth", "2024-01-01 10:15:00")
            .expect("append after tail should succeed");
        assert_eq!(
            store.tail("general", 4).expect("tail should succeed").len(),
            4
        );
    }

    #[test]
    fn tail_saturates_at_both_ends() {
        let (_dir, store) = store();
        seed_general(&store);

        assert!(store.tail("general", 0).expect("tail 0").is_empty());
        assert_eq!(store.tail("general", 100).expect("tail 100").len(), 3);
    }

    #[test]
    fn tail_of_a_never_written_channel_is_empty() {
        let (_dir, store) = store();
        assert!(store.tail("ghost-town", 10).expect("tail").is_empty());
    }

    #[test]
    fn scan_reverse_yields_newest_first_and_none_for_missing_logs() {
        let (_dir, store) = store();
        seed_general(&store);

        let lines: Vec<String> = store
            .scan_reverse("general")
            .expect("scan should succeed")
            .expect("log should exist")
            .collect();
        assert_eq!(lines[0], "[2024-01-01 10:10:00]alice : third");
        assert_eq!(lines[2], "[2024-01-01 10:00:00]alice : first");

        assert!(
            store
                .scan_reverse("ghost-town")
                .expect("scan should succeed")
                .is_none()
        );
    }

    #[test]
    fn log_file_is_created_lazily_per_channel() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let root = dir.path().join("logs");
        let store = ChannelLogStore::open(&root).expect("store should open");

        assert!(root.exists(), "root directory is created at startup");
        assert!(!root.join("general.log").exists());

        store
            .append("general", "alice", "hello", "2024-01-01 10:00:00")
            .expect("append should succeed");
        assert!(root.join("general.log").exists());
        assert!(!root.join("random.log").exists());
    }

    #[test]
    fn unwritable_root_is_a_startup_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let file_in_the_way = dir.path().join("logs");
        std::fs::write(&file_in_the_way, b"not a directory").expect("fixture write");

        let error = ChannelLogStore::open(&file_in_the_way)
            .expect_err("opening over a plain file should fail");
        assert!(matches!(error, Error::Startup { .. }));
    }
}
