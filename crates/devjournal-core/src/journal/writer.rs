//! File Writers (spec §4.10): append-to-daily-file with first-entry header, add-reflection,
//! add-captured-context. All three share path resolution, on-demand directory creation, and
//! the `____`-separated entry format.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveTime};

use crate::error::{Error, Result};
use crate::journal::model::{EntryKind, JournalSections};

const SEPARATOR: &str = "\n\n____\n\n";

/// `<journal_root>/daily/YYYY-MM-DD-journal.md`.
pub fn journal_file_path(journal_root: &Path, date: NaiveDate) -> PathBuf {
    journal_root
        .join("daily")
        .join(format!("{}-journal.md", date.format("%Y-%m-%d")))
}

fn daily_header(date: NaiveDate) -> String {
    format!("# Daily Journal Entries - {}\n\n", date.format("%B %-d, %Y"))
}

fn write_block(path: &Path, block: &str, date: NaiveDate) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if path.exists() {
        let mut content = std::fs::read_to_string(path)?;
        content.push_str(SEPARATOR);
        content.push_str(block);
        std::fs::write(path, content)?;
    } else {
        let mut content = daily_header(date);
        content.push_str(block);
        std::fs::write(path, content)?;
    }
    Ok(())
}

/// Appends a commit's generated journal entry to `<journal_root>/daily/<date>-journal.md`.
/// `commit_time` supplies the section header's timestamp (the commit's own time, per spec).
pub fn append_journal_entry(
    journal_root: &Path,
    date: NaiveDate,
    commit_hash: &str,
    commit_time: NaiveTime,
    sections: &JournalSections,
) -> Result<PathBuf> {
    let path = journal_file_path(journal_root, date);
    let block = sections.to_markdown(&EntryKind::Commit(commit_hash.to_string()), commit_time);
    write_block(&path, &block, date)?;
    Ok(path)
}

/// Appends a manual reflection, timestamped at wall-clock.
pub fn add_reflection(journal_root: &Path, date: NaiveDate, text: &str) -> Result<PathBuf> {
    validate_reflection_date(date)?;
    let path = journal_file_path(journal_root, date);
    let mut sections = JournalSections::default();
    sections.summary = Some(text.to_string());
    let block = sections.to_markdown(&EntryKind::Reflection, Local::now().time());
    write_block(&path, &block, date)?;
    Ok(path)
}

/// Appends a captured AI-knowledge-dump block, timestamped at wall-clock.
pub fn capture_context(journal_root: &Path, date: NaiveDate, text: &str) -> Result<PathBuf> {
    let path = journal_file_path(journal_root, date);
    let mut sections = JournalSections::default();
    sections.summary = Some(text.to_string());
    let block = sections.to_markdown(&EntryKind::AiKnowledgeCapture, Local::now().time());
    write_block(&path, &block, date)?;
    Ok(path)
}

fn validate_reflection_date(date: NaiveDate) -> Result<()> {
    let today = Local::now().date_naive();
    if date > today {
        return Err(Error::internal(format!(
            "reflection date {date} is in the future"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_file_gets_daily_header() {
        let dir = tempfile::tempdir().unwrap();
        let sections = JournalSections {
            summary: Some("did stuff".to_string()),
            ..Default::default()
        };
        let path = append_journal_entry(
            dir.path(),
            date(2025, 6, 3),
            "abc123",
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            &sections,
        )
        .unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("# Daily Journal Entries - June 3, 2025\n\n"));
        assert!(content.contains("### 9:00 AM — Commit abc123"));
    }

    #[test]
    fn second_write_uses_separator_not_header() {
        let dir = tempfile::tempdir().unwrap();
        let sections = JournalSections::default();
        let d = date(2025, 6, 3);
        append_journal_entry(dir.path(), d, "first", NaiveTime::from_hms_opt(9, 0, 0).unwrap(), &sections).unwrap();
        let path = append_journal_entry(dir.path(), d, "second", NaiveTime::from_hms_opt(10, 0, 0).unwrap(), &sections).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.matches("# Daily Journal Entries").count(), 1);
        assert!(content.contains("____"));
        assert!(content.contains("Commit second"));
    }

    #[test]
    fn future_reflection_date_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let future = Local::now().date_naive() + chrono::Duration::days(5);
        let result = add_reflection(dir.path(), future, "too soon");
        assert!(result.is_err());
    }

    #[test]
    fn directory_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let nested_root = dir.path().join("nested").join("journal");
        assert!(!nested_root.exists());
        capture_context(&nested_root, date(2025, 1, 1), "knowledge").unwrap();
        assert!(nested_root.join("daily").exists());
    }
}
