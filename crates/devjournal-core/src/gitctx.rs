//! Commit Context assembly (spec §3): structured git metadata for a single commit, consumed
//! by the Boundary Filter's prompt and by journal entry generation.

use git2::{Diff, Repository};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Default)]
pub struct FileStats {
    pub source: usize,
    pub config: usize,
    pub docs: usize,
    pub tests: usize,
}

#[derive(Debug, Clone)]
pub struct CommitContext {
    pub hash: String,
    pub author: String,
    pub date_iso: String,
    pub message: String,
    pub changed_files: Vec<String>,
    pub file_stats: FileStats,
    pub diff_summary: String,
    pub size_classification: SizeClass,
    pub is_merge: bool,
}

/// Builds a `CommitContext` for `commit_hash` in `repo`.
pub fn collect_commit_context(repo: &Repository, commit_hash: &str) -> Result<CommitContext> {
    let oid = git2::Oid::from_str(commit_hash)?;
    let commit = repo.find_commit(oid)?;

    let hash = commit.id().to_string();
    let author = commit.author().name().unwrap_or("unknown").to_string();
    let date_iso = chrono::DateTime::from_timestamp(commit.time().seconds(), 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();
    let message = commit.message().unwrap_or("").trim().to_string();
    let is_merge = commit.parent_count() > 1;

    let tree = commit.tree()?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

    let mut changed_files = Vec::new();
    let mut file_stats = FileStats::default();
    diff.foreach(
        &mut |delta, _| {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                let path_str = path.to_string_lossy().to_string();
                classify_path(&path_str, &mut file_stats);
                changed_files.push(path_str);
            }
            true
        },
        None,
        None,
        None,
    )?;

    let (insertions, deletions) = diff_line_counts(&diff)?;
    let diff_summary = format!("{insertions} insertions(+), {deletions} deletions(-)");
    let size_classification = classify_size(insertions + deletions);

    Ok(CommitContext {
        hash,
        author,
        date_iso,
        message,
        changed_files,
        file_stats,
        diff_summary,
        size_classification,
        is_merge,
    })
}

fn diff_line_counts(diff: &Diff) -> Result<(usize, usize)> {
    let stats = diff.stats()?;
    Ok((stats.insertions(), stats.deletions()))
}

fn classify_size(total_lines: usize) -> SizeClass {
    if total_lines < 10 {
        SizeClass::Small
    } else if total_lines < 50 {
        SizeClass::Medium
    } else {
        SizeClass::Large
    }
}

fn classify_path(path: &str, stats: &mut FileStats) {
    let lower = path.to_lowercase();
    if lower.contains("test") {
        stats.tests += 1;
    } else if lower.ends_with(".md") || lower.contains("docs/") {
        stats.docs += 1;
    } else if lower.ends_with(".toml")
        || lower.ends_with(".yaml")
        || lower.ends_with(".yml")
        || lower.ends_with(".json")
        || lower.ends_with(".lock")
    {
        stats.config += 1;
    } else {
        stats.source += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_size_thresholds() {
        assert_eq!(classify_size(0), SizeClass::Small);
        assert_eq!(classify_size(9), SizeClass::Small);
        assert_eq!(classify_size(10), SizeClass::Medium);
        assert_eq!(classify_size(49), SizeClass::Medium);
        assert_eq!(classify_size(50), SizeClass::Large);
    }

    #[test]
    fn classify_path_detects_tests() {
        let mut stats = FileStats::default();
        classify_path("src/tests/foo.rs", &mut stats);
        assert_eq!(stats.tests, 1);
    }

    #[test]
    fn classify_path_detects_docs_and_config() {
        let mut stats = FileStats::default();
        classify_path("README.md", &mut stats);
        classify_path("Cargo.toml", &mut stats);
        assert_eq!(stats.docs, 1);
        assert_eq!(stats.config, 1);
    }
}
