//! Rotating file sink for the Hook Worker (spec §4.9, §6), grounded on
//! `git_hook_worker.setup_hook_logging`. Stamps each line with the commit's own timestamp once
//! one is known, falling back to wall-clock before that point — installed only by `devjournal hook`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local, Utc};
use log::{Level, Log, Metadata, Record};

const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;

pub fn hook_log_path(repo_path: &Path) -> PathBuf {
    repo_path.join(".git").join("hooks").join("devjournal.log")
}

pub struct HookLogger {
    path: PathBuf,
    commit_timestamp: Mutex<Option<DateTime<Utc>>>,
}

impl HookLogger {
    /// Rotates any oversized existing log (rename to `.old`, replacing a prior `.old`), then
    /// returns a logger that writes formatted lines at `path`.
    pub fn init(path: PathBuf) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if let Ok(metadata) = std::fs::metadata(&path) {
            if metadata.len() > ROTATE_AT_BYTES {
                let old_path = path.with_extension("log.old");
                let _ = std::fs::remove_file(&old_path);
                std::fs::rename(&path, &old_path)?;
            }
        }

        Ok(Self {
            path,
            commit_timestamp: Mutex::new(None),
        })
    }

    /// Once a commit is resolved, subsequent lines are stamped with its timestamp instead of
    /// wall-clock, keeping the hook log consistent with the rest of the pipeline.
    pub fn set_commit_timestamp(&self, ts: DateTime<Utc>) {
        *self.commit_timestamp.lock().unwrap() = Some(ts);
    }

    /// The timestamp set by `set_commit_timestamp`, if any. Exposed for tests that need to
    /// confirm a caller actually reached that call.
    pub fn commit_timestamp(&self) -> Option<DateTime<Utc>> {
        *self.commit_timestamp.lock().unwrap()
    }

    fn current_timestamp(&self) -> DateTime<Utc> {
        self.commit_timestamp
            .lock()
            .unwrap()
            .unwrap_or_else(|| Local::now().with_timezone(&Utc))
    }
}

impl Log for HookLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{}] {}\n",
            self.current_timestamp().to_rfc3339(),
            record.level(),
            record.args()
        );
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_oversized_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devjournal.log");
        std::fs::write(&path, vec![b'x'; (ROTATE_AT_BYTES + 1) as usize]).unwrap();

        HookLogger::init(path.clone()).unwrap();

        assert!(!path.exists());
        assert!(path.with_extension("log.old").exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hooks").join("devjournal.log");
        HookLogger::init(path.clone()).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn small_existing_log_is_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devjournal.log");
        std::fs::write(&path, b"small log content").unwrap();
        HookLogger::init(path.clone()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("log.old").exists());
    }
}
