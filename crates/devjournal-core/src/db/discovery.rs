//! Database Discovery (spec §4.2): recursively find `state.vscdb` files under a workspace
//! storage directory, filtering out anything the developer hasn't touched recently.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

const RECENCY_WINDOW: Duration = Duration::from_secs(48 * 3600);

/// Finds all `state.vscdb` files under `storage_dir` modified within the last 48 hours,
/// sorted newest first. Permission errors during traversal are logged and skipped, never fatal.
pub fn find_candidate_databases(storage_dir: &Path) -> Vec<PathBuf> {
    let now = SystemTime::now();
    let mut found: Vec<(PathBuf, SystemTime)> = Vec::new();

    for entry in WalkDir::new(storage_dir)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::debug!("skipping unreadable path during database discovery: {err}");
                None
            }
        })
    {
        if entry.file_name() != "state.vscdb" {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        match now.duration_since(modified) {
            Ok(age) if age <= RECENCY_WINDOW => found.push((entry.path().to_path_buf(), modified)),
            Err(_) => found.push((entry.path().to_path_buf(), modified)), // modified in the future; keep it
            _ => {}
        }
    }

    found.sort_by(|a, b| b.1.cmp(&a.1));
    found.into_iter().map(|(path, _)| path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_recent_state_vscdb_files() {
        let dir = tempdir().unwrap();
        let ws = dir.path().join("abc123");
        fs::create_dir_all(&ws).unwrap();
        fs::write(ws.join("state.vscdb"), b"").unwrap();
        fs::write(ws.join("workspace.json"), b"{}").unwrap();

        let found = find_candidate_databases(dir.path());
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("state.vscdb"));
    }

    #[test]
    fn ignores_unrelated_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        let found = find_candidate_databases(dir.path());
        assert!(found.is_empty());
    }

    #[test]
    fn missing_directory_returns_empty() {
        let found = find_candidate_databases(Path::new("/nonexistent/path/for/devjournal/test"));
        assert!(found.is_empty());
    }
}
