//! Time Window Resolver (spec §4.4): derives a `[start_ms, end_ms]` window from a commit's
//! parent timestamp, or a 24h lookback for a first commit. Merge commits are skipped entirely.

use std::time::Instant;

use git2::{Oid, Repository};

const PERFORMANCE_BUDGET_MS: u128 = 100;
const DAY_MS: i64 = 24 * 3_600 * 1_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    CommitBased,
    FirstCommit,
    Fallback24h,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub strategy: Strategy,
    pub start_ms: i64,
    pub end_ms: i64,
    pub duration_hours: f64,
}

pub fn is_merge_commit(commit: &git2::Commit) -> bool {
    commit.parent_count() > 1
}

pub fn commit_timestamp_ms(commit: &git2::Commit) -> i64 {
    commit.time().seconds() * 1000
}

/// Computes the window for a commit already known not to be a merge. Any inconsistency in
/// reading the parent falls back to a 24h window, matching `calculate_time_window`'s original
/// trichotomy.
pub fn calculate_time_window(commit: &git2::Commit) -> TimeWindow {
    let current_ms = commit_timestamp_ms(commit);

    if commit.parent_count() == 0 {
        return TimeWindow {
            strategy: Strategy::FirstCommit,
            start_ms: current_ms - DAY_MS,
            end_ms: current_ms,
            duration_hours: 24.0,
        };
    }

    match commit.parent(0) {
        Ok(parent) => {
            let parent_ms = commit_timestamp_ms(&parent);
            let duration_hours = (current_ms - parent_ms) as f64 / 1000.0 / 3600.0;
            TimeWindow {
                strategy: Strategy::CommitBased,
                start_ms: parent_ms,
                end_ms: current_ms,
                duration_hours,
            }
        }
        Err(e) => {
            log::warn!("error resolving parent commit, using 24h fallback: {e}");
            TimeWindow {
                strategy: Strategy::Fallback24h,
                start_ms: current_ms - DAY_MS,
                end_ms: current_ms,
                duration_hours: 24.0,
            }
        }
    }
}

/// Full entry point: resolves the commit by hash, returns `None` for merge commits (caller
/// abandons journal generation for that commit), and falls back to a wall-clock-based 24h
/// window if the hash can't even be resolved.
pub fn get_commit_time_window(repo: &Repository, commit_hash: &str) -> Option<TimeWindow> {
    let start = Instant::now();

    let oid = match Oid::from_str(commit_hash) {
        Ok(oid) => oid,
        Err(e) => {
            log::warn!("invalid commit hash {commit_hash}: {e}");
            return Some(wall_clock_fallback());
        }
    };

    let commit = match repo.find_commit(oid) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("could not resolve commit {commit_hash}: {e}");
            return Some(wall_clock_fallback());
        }
    };

    if is_merge_commit(&commit) {
        log::debug!("skipping merge commit {commit_hash}");
        return None;
    }

    let window = calculate_time_window(&commit);

    let elapsed = start.elapsed().as_millis();
    if elapsed > PERFORMANCE_BUDGET_MS {
        log::warn!("commit time window resolution took {elapsed}ms (budget {PERFORMANCE_BUDGET_MS}ms)");
    }

    Some(window)
}

fn wall_clock_fallback() -> TimeWindow {
    let now_ms = chrono::Utc::now().timestamp_millis();
    TimeWindow {
        strategy: Strategy::Fallback24h,
        start_ms: now_ms - DAY_MS,
        end_ms: now_ms,
        duration_hours: 24.0,
    }
}
