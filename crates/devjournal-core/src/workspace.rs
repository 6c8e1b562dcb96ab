//! Workspace Matcher (spec §4.3): scores candidate Cursor workspace databases against the
//! current repository and picks the best match, falling back to most-recently-modified.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::db::messages::extract_folder_from_workspace_json;
use crate::error::{Error, Result};

const CONFIDENCE_THRESHOLD: f64 = 0.8;
const PERFORMANCE_BUDGET_MS: u128 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchType {
    GitRemote,
    FolderPath,
    FolderName,
    MostRecent,
}

#[derive(Debug, Clone)]
pub struct WorkspaceMatch {
    pub db_path: PathBuf,
    pub confidence: f64,
    pub match_type: MatchType,
    pub workspace_folder: Option<String>,
    pub git_remote: Option<String>,
}

struct Candidate {
    hash_dir: PathBuf,
    db_path: PathBuf,
    workspace_folder: Option<String>,
}

/// Scans `storage_dir` for workspace-hash subdirectories holding both `workspace.json` and
/// `state.vscdb`, scores each against `repo_path`, and returns the best match.
pub fn detect_workspace_for_repo(storage_dir: &Path, repo_path: &Path) -> Result<WorkspaceMatch> {
    let start = Instant::now();

    if !repo_path.exists() {
        return Err(Error::not_found(format!(
            "repository path does not exist: {}",
            repo_path.display()
        )));
    }

    let candidates = scan_workspace_directories(storage_dir);
    let git_remotes = get_git_remote_urls(repo_path);

    let mut scored: Vec<WorkspaceMatch> = candidates
        .iter()
        .map(|c| score_candidate(c, repo_path, &git_remotes))
        .collect();

    scored.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());

    let elapsed = start.elapsed().as_millis();
    if elapsed > PERFORMANCE_BUDGET_MS {
        log::warn!("workspace matching took {elapsed}ms (budget {PERFORMANCE_BUDGET_MS}ms)");
    }

    match scored.first() {
        Some(best) if best.confidence >= CONFIDENCE_THRESHOLD => Ok(best.clone()),
        _ => most_recent_workspace(storage_dir)
            .ok_or_else(|| Error::not_found("no Cursor workspace databases found")),
    }
}

fn scan_workspace_directories(storage_dir: &Path) -> Vec<Candidate> {
    let mut out = Vec::new();
    let Ok(entries) = std::fs::read_dir(storage_dir) else {
        return out;
    };

    for entry in entries.flatten() {
        let hash_dir = entry.path();
        if !hash_dir.is_dir() {
            continue;
        }
        let workspace_json = hash_dir.join("workspace.json");
        let db_path = hash_dir.join("state.vscdb");
        if !workspace_json.is_file() || !db_path.is_file() {
            continue;
        }

        let workspace_folder = std::fs::read_to_string(&workspace_json)
            .ok()
            .and_then(|raw| extract_folder_from_workspace_json(&raw));

        out.push(Candidate {
            hash_dir,
            db_path,
            workspace_folder,
        });
    }
    out
}

fn most_recent_workspace(storage_dir: &Path) -> Option<WorkspaceMatch> {
    let Ok(entries) = std::fs::read_dir(storage_dir) else {
        return None;
    };

    let mut best: Option<(PathBuf, std::time::SystemTime, Option<String>)> = None;
    for entry in entries.flatten() {
        let hash_dir = entry.path();
        let db_path = hash_dir.join("state.vscdb");
        if !db_path.is_file() {
            continue;
        }
        let Ok(metadata) = db_path.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };

        if best.as_ref().map(|(_, t, _)| modified > *t).unwrap_or(true) {
            let folder = std::fs::read_to_string(hash_dir.join("workspace.json"))
                .ok()
                .and_then(|raw| extract_folder_from_workspace_json(&raw));
            best = Some((db_path, modified, folder));
        }
    }

    best.map(|(db_path, _, folder)| WorkspaceMatch {
        db_path,
        confidence: 0.0,
        match_type: MatchType::MostRecent,
        workspace_folder: folder,
        git_remote: None,
    })
}

fn score_candidate(candidate: &Candidate, repo_path: &Path, repo_remotes: &[String]) -> WorkspaceMatch {
    let base = WorkspaceMatch {
        db_path: candidate.db_path.clone(),
        confidence: 0.0,
        match_type: MatchType::MostRecent,
        workspace_folder: candidate.workspace_folder.clone(),
        git_remote: None,
    };

    // Git remote scoring is not determinable from workspace.json alone (it never records one,
    // per the original implementation); real matching happens via folder path/name below. The
    // `repo_remotes` parameter is retained so this function's signature documents the scoring
    // inputs spec §4.3 describes in full.
    let _ = repo_remotes;

    let Some(ref folder) = candidate.workspace_folder else {
        return base;
    };

    let repo_norm = normalize_path(repo_path);
    let folder_norm = normalize_path(Path::new(folder));

    if repo_norm == folder_norm {
        return WorkspaceMatch {
            confidence: 0.85,
            match_type: MatchType::FolderPath,
            ..base
        };
    }

    let repo_real = std::fs::canonicalize(repo_path).unwrap_or_else(|_| repo_path.to_path_buf());
    let folder_real =
        std::fs::canonicalize(Path::new(folder)).unwrap_or_else(|_| PathBuf::from(folder));
    if repo_real == folder_real {
        return WorkspaceMatch {
            confidence: 0.82,
            match_type: MatchType::FolderPath,
            ..base
        };
    }

    let repo_name = repo_path
        .file_name()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let folder_name = Path::new(folder)
        .file_name()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let ratio = lcs_ratio(&repo_name, &folder_name);
    let confidence = if ratio >= 0.9 {
        0.75
    } else if ratio >= 0.8 {
        0.70
    } else if ratio >= 0.6 {
        0.60
    } else {
        ratio * 0.5
    };

    WorkspaceMatch {
        confidence,
        match_type: MatchType::FolderName,
        ..base
    }
}

fn normalize_path(p: &Path) -> String {
    p.to_string_lossy().trim_end_matches('/').to_string()
}

/// Longest-common-subsequence ratio: `2 * lcs_len / (len_a + len_b)`, matching the shape of
/// `difflib.SequenceMatcher.ratio()` over two basenames.
fn lcs_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (n, m) = (a_chars.len(), b_chars.len());

    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            dp[i][j] = if a_chars[i - 1] == b_chars[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let lcs_len = dp[n][m] as f64;
    (2.0 * lcs_len) / ((n + m) as f64)
}

/// Parses `git remote -v` output normalized URLs, used to score against a repo's configured
/// remotes. SSH `git@host:a/b` is converted to `https://host/a/b`, `.git` suffix stripped,
/// lowercased, trailing `/` stripped.
pub fn normalize_git_url(url: &str) -> String {
    let mut normalized = url.trim().to_string();
    if let Some(stripped) = normalized.strip_suffix(".git") {
        normalized = stripped.to_string();
    }
    if let Some(rest) = normalized.strip_prefix("git@") {
        if let Some((host, path)) = rest.split_once(':') {
            normalized = format!("https://{host}/{path}");
        }
    }
    normalized.to_lowercase().trim_end_matches('/').to_string()
}

fn get_git_remote_urls(repo_path: &Path) -> Vec<String> {
    let Ok(repo) = git2::Repository::discover(repo_path) else {
        return Vec::new();
    };
    let Ok(remotes) = repo.remotes() else {
        return Vec::new();
    };

    let mut urls = std::collections::HashSet::new();
    for name in remotes.iter().flatten() {
        if let Ok(remote) = repo.find_remote(name) {
            if let Some(url) = remote.url() {
                urls.insert(url.to_string());
            }
        }
    }
    urls.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcs_ratio_identical_strings_is_one() {
        assert_eq!(lcs_ratio("myproject", "myproject"), 1.0);
    }

    #[test]
    fn lcs_ratio_empty_strings_is_one() {
        assert_eq!(lcs_ratio("", ""), 1.0);
    }

    #[test]
    fn lcs_ratio_completely_different_is_low() {
        let ratio = lcs_ratio("abcdef", "ghijkl");
        assert!(ratio < 0.3);
    }

    #[test]
    fn normalize_git_url_ssh_to_https() {
        assert_eq!(
            normalize_git_url("git@github.com:acme/widgets.git"),
            "https://github.com/acme/widgets"
        );
    }

    #[test]
    fn normalize_git_url_strips_trailing_slash_and_lowercases() {
        assert_eq!(
            normalize_git_url("HTTPS://GitHub.com/Acme/Widgets/"),
            "https://github.com/acme/widgets"
        );
    }

    #[test]
    fn no_workspaces_found_is_not_found_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = tempfile::tempdir().unwrap();
        let result = detect_workspace_for_repo(dir.path(), repo.path());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
