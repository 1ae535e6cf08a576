//! Per-chain append-only log sink
//!
//! Every relayer writes its connects, disconnects, received events, and
//! constructed claims to `relayer-<chainId>.log` in addition to the process
//! log. This is observability, not part of the correctness contract, so
//! append failures are logged and swallowed.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};
use tracing::warn;

pub struct ChainLogSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl ChainLogSink {
    /// Open (or create) the sink file for a chain, in append mode.
    pub fn open(dir: impl AsRef<Path>, chain_id: u64) -> std::io::Result<Self> {
        let path = dir.as_ref().join(format!("relayer-{}.log", chain_id));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    /// Append a timestamped line. Best-effort; a closed sink drops the line.
    pub fn append(&self, message: &str) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = format!("[{}] {}\n", timestamp, message);

        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(file) = guard.as_mut() {
            if let Err(e) = file.write_all(line.as_bytes()) {
                warn!(path = %self.path.display(), error = %e, "Failed to append to chain log");
            }
        }
    }

    /// Close the sink. Idempotent; subsequent appends are dropped.
    pub fn close(&self) {
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_timestamped_lines() {
        let dir = TempDir::new().unwrap();
        let sink = ChainLogSink::open(dir.path(), 84532).unwrap();

        sink.append("Connected to network");
        sink.append("TokenLocked event detected");

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("Connected to network"));
    }

    #[test]
    fn test_close_is_idempotent_and_drops_appends() {
        let dir = TempDir::new().unwrap();
        let sink = ChainLogSink::open(dir.path(), 1).unwrap();

        sink.append("before close");
        sink.close();
        sink.close();
        sink.append("after close");

        let content = std::fs::read_to_string(sink.path()).unwrap();
        assert!(content.contains("before close"));
        assert!(!content.contains("after close"));
    }
}
