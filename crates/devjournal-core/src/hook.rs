//! Hook Worker (spec §4.9): orchestrates a single commit through every subsystem. Runs to
//! completion; every caller-visible outcome is success — the git operation this is wired to must
//! never be blocked by a failure here.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use git2::Repository;

use crate::boundary::{filter_chat_for_commit, AiInvoker};
use crate::config::{self, AppConfig};
use crate::db::{discovery, messages};
use crate::gitctx::{self, CommitContext};
use crate::hook_logger::HookLogger;
use crate::journal;
use crate::platform;
use crate::summary;
use crate::timewindow;
use crate::workspace;

/// Records what happened for a single `run` invocation, for logging and tests. Never surfaced
/// to the caller as an error — the Hook Worker always reports overall success.
#[derive(Debug, Default)]
pub struct HookOutcome {
    pub journal_entry_written: bool,
    pub daily_summary_due: Option<NaiveDate>,
    pub period_summaries: summary::PendingSummaries,
    pub skipped_reason: Option<String>,
}

struct LiveAiInvoker<'a> {
    config: &'a crate::config::AiConfig,
}

impl<'a> AiInvoker for LiveAiInvoker<'a> {
    fn invoke(&self, prompt: &str, _context: &serde_json::Value) -> String {
        // The Boundary Filter's AiInvoker trait is synchronous (it's exercised from both async
        // and test contexts); block on the async AI Invoker here since this call only ever runs
        // inside the already-async `run`.
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(crate::ai::invoke_ai(self.config, prompt, false))
        })
    }
}

/// Runs the full per-commit pipeline against `repo_path`. Every stage degrades independently;
/// this function itself never returns an `Err` — callers that need a process exit code should
/// always exit 0 regardless of the returned `HookOutcome`.
///
/// `logger`, when given, has its commit timestamp set as soon as HEAD resolves, so every
/// subsequent log line this run produces is stamped with the commit's own time rather than
/// wall-clock (spec §4.9 step 3).
pub async fn run(repo_path: &Path, logger: Option<&HookLogger>) -> HookOutcome {
    let mut outcome = HookOutcome::default();

    if !repo_path.join(".git").exists() {
        log::warn!("not a git repository: {}", repo_path.display());
        outcome.skipped_reason = Some("not a git repository".to_string());
        return outcome;
    }

    let config = match config::load_config(repo_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("failed to load configuration, using defaults: {e}");
            AppConfig::default()
        }
    };

    let repo = match Repository::open(repo_path) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("failed to open repository: {e}");
            outcome.skipped_reason = Some("failed to open repository".to_string());
            return outcome;
        }
    };

    let head_commit = match repo.head().and_then(|h| h.peel_to_commit()) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("failed to resolve HEAD commit: {e}");
            outcome.skipped_reason = Some("no HEAD commit".to_string());
            return outcome;
        }
    };
    let commit_hash = head_commit.id().to_string();

    if let Some(logger) = logger {
        if let Some(ts) = chrono::DateTime::from_timestamp(head_commit.time().seconds(), 0) {
            logger.set_commit_timestamp(ts);
        }
    }

    let commit_context = match gitctx::collect_commit_context(&repo, &commit_hash) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("failed to collect commit context: {e}");
            outcome.skipped_reason = Some("failed to collect commit context".to_string());
            return outcome;
        }
    };

    if commit_context.is_merge {
        log::info!("merge commit skipped: {commit_hash}");
        outcome.skipped_reason = Some("merge_skipped".to_string());
        return outcome;
    }

    if config::is_journal_only_commit(&config, &commit_context.changed_files) {
        log::info!("journal-only commit skipped: {commit_hash}");
        outcome.skipped_reason = Some("journal_only_commit".to_string());
        return outcome;
    }

    let journal_root = repo_path.join(&config.journal.path);
    let commit_date = commit_context
        .date_iso
        .split('T')
        .next()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive());
    let commit_time = head_commit.time();
    let naive_time = chrono::DateTime::from_timestamp(commit_time.seconds(), 0)
        .map(|dt| dt.time())
        .unwrap_or_else(|| Utc::now().time());

    let discussion = assemble_discussion(&config, &repo, repo_path, &head_commit, &commit_context, &journal_root, commit_date).await;

    let sections = journal::generate_sections(&config.ai, &commit_context, &discussion).await;

    match journal::append_journal_entry(&journal_root, commit_date, &commit_hash, naive_time, &sections) {
        Ok(path) => {
            log::info!("journal entry written: {}", path.display());
            outcome.journal_entry_written = true;
        }
        Err(e) => {
            log::warn!("failed to write journal entry: {e}");
        }
    }

    let summaries_dir = journal_root.join("summaries");
    let journal_dir = journal_root.join("daily");
    outcome.daily_summary_due =
        summary::should_generate_daily_summary(commit_date, &journal_dir, &summaries_dir.join("daily"));

    let last_commit_date = head_commit
        .parent(0)
        .ok()
        .and_then(|p| chrono::DateTime::from_timestamp(p.time().seconds(), 0))
        .map(|dt| dt.date_naive());

    outcome.period_summaries =
        summary::should_generate_period_summaries(commit_date, &summaries_dir, last_commit_date);

    log::info!(
        "hook worker completed for {commit_hash}: journal_written={} period_summaries={:?}",
        outcome.journal_entry_written,
        outcome.period_summaries
    );

    outcome
}

async fn assemble_discussion(
    config: &AppConfig,
    repo: &Repository,
    repo_path: &Path,
    head_commit: &git2::Commit<'_>,
    commit_context: &CommitContext,
    journal_root: &Path,
    commit_date: NaiveDate,
) -> Vec<crate::boundary::FilteredMessage> {
    let Some(window) = timewindow::get_commit_time_window(repo, &commit_context.hash) else {
        return Vec::new();
    };

    let storage_dirs = match platform::get_cursor_workspace_paths() {
        Ok(dirs) => dirs,
        Err(e) => {
            log::warn!("could not locate IDE workspace storage: {e}");
            return Vec::new();
        }
    };

    let Some(storage_dir) = storage_dirs.into_iter().find(|d| d.is_dir()) else {
        log::info!("no IDE workspace storage directories found on this machine");
        return Vec::new();
    };

    let workspace_match = match workspace::detect_workspace_for_repo(&storage_dir, repo_path) {
        Ok(m) => m,
        Err(e) => {
            log::info!("no workspace match found: {e}");
            return Vec::new();
        }
    };

    let candidates = discovery::find_candidate_databases(&storage_dir);
    // Cursor keeps per-message bodies in a single globalStorage database, a sibling of the
    // workspaceStorage directory each candidate lives under, not inside it.
    let global_db = storage_dir
        .parent()
        .map(|user_dir| user_dir.join("globalStorage").join("state.vscdb"))
        .unwrap_or_else(|| storage_dir.join("state.vscdb"));

    let mut all_messages = Vec::new();
    for candidate in candidates {
        match messages::assemble_messages(&candidate, &global_db, window.start_ms, window.end_ms) {
            Ok(msgs) => all_messages.push(msgs),
            // Message Assembler errors are classified internally as Query; per spec §7 they
            // surface as Access once they cross this component boundary.
            Err(e) => log::debug!("skipping candidate database {}: {}", candidate.display(), e.as_access()),
        }
    }
    if all_messages.is_empty() && workspace_match.db_path.exists() {
        if let Ok(msgs) = messages::assemble_messages(&workspace_match.db_path, &global_db, window.start_ms, window.end_ms) {
            all_messages.push(msgs);
        }
    }

    let merged = messages::merge_message_sets(all_messages);
    if merged.is_empty() {
        return Vec::new();
    }

    let previous_journal_entry = journal::get_previous_journal_entry(journal_root, commit_date);
    let previous_commit_message = head_commit
        .parent(0)
        .ok()
        .and_then(|p| p.message().map(|s| s.to_string()));

    let invoker = LiveAiInvoker { config: &config.ai };
    match filter_chat_for_commit(
        &merged,
        commit_context,
        previous_commit_message.as_deref(),
        previous_journal_entry.as_deref(),
        &invoker,
    ) {
        Ok(filtered) => filtered,
        Err(e) => {
            log::warn!("boundary filter rejected input: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn commit(
        repo: &Repository,
        path_in_repo: &Path,
        content: &str,
        message: &str,
        parents: &[&git2::Commit],
    ) -> git2::Oid {
        let full_path = repo.workdir().unwrap().join(path_in_repo);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(path_in_repo).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("Test User", "test@example.com").unwrap();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, parents)
            .unwrap()
    }

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[tokio::test]
    async fn run_skips_non_git_directory() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(dir.path(), None).await;
        assert!(!outcome.journal_entry_written);
        assert_eq!(outcome.skipped_reason.as_deref(), Some("not a git repository"));
    }

    #[tokio::test]
    async fn run_skips_merge_commits() {
        let (dir, repo) = init_repo();
        let first = commit(&repo, Path::new("a.txt"), "a", "first", &[]);
        let first_commit = repo.find_commit(first).unwrap();

        let second = commit(&repo, Path::new("b.txt"), "b", "second", &[&first_commit]);
        let second_commit = repo.find_commit(second).unwrap();

        let mut index = repo.index().unwrap();
        fs::write(dir.path().join("c.txt"), "c").unwrap();
        index.add_path(Path::new("c.txt")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
        repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            "merge",
            &tree,
            &[&second_commit, &first_commit],
        )
        .unwrap();

        let outcome = run(dir.path(), None).await;
        assert_eq!(outcome.skipped_reason.as_deref(), Some("merge_skipped"));
        assert!(!outcome.journal_entry_written);
    }

    #[tokio::test]
    async fn run_skips_journal_only_commits() {
        let (dir, repo) = init_repo();
        commit(&repo, Path::new("README.md"), "hello", "init", &[]);
        let head = repo.head().and_then(|h| h.peel_to_commit()).unwrap();
        commit(
            &repo,
            Path::new("journal/daily/2026-01-01-journal.md"),
            "entry",
            "journal update",
            &[&head],
        );

        let outcome = run(dir.path(), None).await;
        assert_eq!(outcome.skipped_reason.as_deref(), Some("journal_only_commit"));
    }

    #[tokio::test]
    async fn run_writes_journal_entry_for_a_normal_commit() {
        let (dir, repo) = init_repo();
        commit(&repo, Path::new("src/lib.rs"), "fn main() {}", "add lib", &[]);

        let outcome = run(dir.path(), None).await;
        assert!(outcome.skipped_reason.is_none());
        assert!(outcome.journal_entry_written);

        let entries = fs::read_dir(dir.path().join("journal/daily")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn run_stamps_the_logger_with_the_commits_own_timestamp() {
        let (dir, repo) = init_repo();
        let oid = commit(&repo, Path::new("src/lib.rs"), "fn main() {}", "add lib", &[]);
        let expected =
            chrono::DateTime::from_timestamp(repo.find_commit(oid).unwrap().time().seconds(), 0).unwrap();

        let logger = HookLogger::init(dir.path().join("devjournal.log")).unwrap();
        run(dir.path(), Some(&logger)).await;

        assert_eq!(logger.commit_timestamp(), Some(expected));
    }
}
