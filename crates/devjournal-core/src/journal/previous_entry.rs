//! Looks back up to 7 days for the most recent journal entry, used as AI context for the
//! Boundary Filter's prompt (grounded on the "previous journal entry" lookback).

use std::path::Path;

use chrono::NaiveDate;
use regex::Regex;

const LOOKBACK_DAYS: i64 = 7;

fn header_pattern() -> Regex {
    Regex::new(r"(?im)^(#{2,3})\s*(.+?)\s*[-—]\s*Commit\s+([\w-]+)").unwrap()
}

/// Returns the most recent entry block (from its header to end of file) found in the journal
/// file for `commit_date - 1` day, walking back up to 7 days if that file doesn't exist or has
/// no commit-entry headers.
pub fn get_previous_journal_entry(journal_root: &Path, commit_date: NaiveDate) -> Option<String> {
    let pattern = header_pattern();

    for days_back in 1..=LOOKBACK_DAYS {
        let previous_date = commit_date - chrono::Duration::days(days_back);
        let journal_path = journal_root
            .join("daily")
            .join(format!("{}-journal.md", previous_date.format("%Y-%m-%d")));

        let Ok(content) = std::fs::read_to_string(&journal_path) else {
            continue;
        };

        if let Some(last_match) = pattern.find_iter(&content).last() {
            return Some(content[last_match.start()..].trim().to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn finds_last_entry_in_previous_days_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("daily")).unwrap();
        let content = "### 9:00 AM — Commit aaa\n\nfirst\n\n____\n\n### 10:00 AM — Commit bbb\n\nsecond";
        std::fs::write(dir.path().join("daily").join("2025-06-02-journal.md"), content).unwrap();

        let result = get_previous_journal_entry(dir.path(), date(2025, 6, 3));
        assert!(result.unwrap().starts_with("### 10:00 AM — Commit bbb"));
    }

    #[test]
    fn walks_back_multiple_days_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("daily")).unwrap();
        let content = "### 9:00 AM — Commit ccc\n\nolder entry";
        std::fs::write(dir.path().join("daily").join("2025-05-30-journal.md"), content).unwrap();

        let result = get_previous_journal_entry(dir.path(), date(2025, 6, 3));
        assert!(result.unwrap().contains("ccc"));
    }

    #[test]
    fn returns_none_when_nothing_within_window() {
        let dir = tempfile::tempdir().unwrap();
        let result = get_previous_journal_entry(dir.path(), date(2025, 6, 3));
        assert!(result.is_none());
    }
}
