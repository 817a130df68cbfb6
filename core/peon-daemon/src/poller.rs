//! State-file poller.
//!
//! The hook writer rewrites `state.json` in place; each poll reads the file
//! only when its size or mtime moved since the last successful parse.
//! Anything unreadable counts as "no new record" for that tick.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use peon_protocol::{parse_state, EventRecord};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

pub struct StatePoller {
    path: PathBuf,
    last_stamp: Option<FileStamp>,
}

impl StatePoller {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_stamp: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file's current record when the file changed since the last
    /// parse, `None` otherwise.
    pub fn poll(&mut self) -> Option<EventRecord> {
        let metadata = match fs_err::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.last_stamp = None;
                return None;
            }
            Err(err) => {
                warn!(error = %err, "Failed to stat state file");
                return None;
            }
        };

        let stamp = FileStamp {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        };
        if self.last_stamp == Some(stamp) {
            return None;
        }

        let bytes = match fs_err::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "Failed to read state file");
                return None;
            }
        };

        match parse_state(&bytes) {
            Ok(record) => {
                self.last_stamp = Some(stamp);
                record
            }
            Err(err) => {
                // Likely caught mid-write; retry on the next poll.
                debug!(code = %err.code, message = %err.message, "Ignoring state file snapshot");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SESSION: &str = "12345678-1234-1234-1234-123456789abc";

    fn write_state(path: &Path, body: &str) {
        fs_err::write(path, body).expect("write state");
    }

    #[test]
    fn missing_file_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let mut poller = StatePoller::new(dir.path().join("state.json"));
        assert!(poller.poll().is_none());
    }

    #[test]
    fn reads_last_event_once_per_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        write_state(
            &path,
            &format!(
                r#"{{"last_event":{{"timestamp":1000,"event":"Stop","session_id":"{}"}}}}"#,
                SESSION
            ),
        );

        let mut poller = StatePoller::new(path);
        let record = poller.poll().expect("record");
        assert_eq!(record.timestamp, Some(1000));
        assert_eq!(record.event, "Stop");
        assert_eq!(record.session_id.as_deref(), Some(SESSION));

        assert!(poller.poll().is_none());
    }

    #[test]
    fn rewritten_file_is_read_again() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        write_state(&path, r#"{"last_event":{"timestamp":1000,"event":"Stop"}}"#);

        let mut poller = StatePoller::new(path.clone());
        assert!(poller.poll().is_some());

        write_state(
            &path,
            r#"{"last_event":{"timestamp":2000,"event":"UserPromptSubmit","cwd":"/tmp/project"}}"#,
        );
        let record = poller.poll().expect("record");
        assert_eq!(record.timestamp, Some(2000));
        assert_eq!(record.cwd.as_deref(), Some("/tmp/project"));
    }

    #[test]
    fn malformed_snapshot_is_skipped_and_retried() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        write_state(&path, r#"{"last_event":{"timest"#);

        let mut poller = StatePoller::new(path.clone());
        assert!(poller.poll().is_none());

        write_state(&path, r#"{"last_active":{"timestamp":3000,"event":"Stop"}}"#);
        let record = poller.poll().expect("record");
        assert_eq!(record.timestamp, Some(3000));
    }

    #[test]
    fn empty_file_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        write_state(&path, "");

        let mut poller = StatePoller::new(path);
        assert!(poller.poll().is_none());
    }
}
