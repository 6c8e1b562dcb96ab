//! Summary Trigger (spec §4.8): decides which period summaries (daily/weekly/monthly/
//! quarterly/yearly) a commit's journal entry should cascade into, walking day-by-day across
//! any gap since the previous commit so a delayed commit doesn't silently skip a boundary.

use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::filenames::{
    monthly_summary_candidates, quarterly_summary_candidates, weekly_summary_candidates,
    yearly_summary_candidates,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingSummaries {
    pub weekly: bool,
    pub monthly: bool,
    pub quarterly: bool,
    pub yearly: bool,
}

impl PendingSummaries {
    pub fn any(&self) -> bool {
        self.weekly || self.monthly || self.quarterly || self.yearly
    }
}

fn candidate_exists(dir: &Path, candidates: &[String]) -> bool {
    candidates.iter().any(|name| dir.join(name).exists())
}

fn weekly_summary_exists(date: NaiveDate, summaries_dir: &Path) -> bool {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    candidate_exists(&summaries_dir.join("weekly"), &weekly_summary_candidates(monday))
}

fn monthly_summary_exists(date: NaiveDate, summaries_dir: &Path) -> bool {
    candidate_exists(&summaries_dir.join("monthly"), &monthly_summary_candidates(date))
}

fn quarterly_summary_exists(date: NaiveDate, summaries_dir: &Path) -> bool {
    candidate_exists(&summaries_dir.join("quarterly"), &quarterly_summary_candidates(date))
}

fn yearly_summary_exists(date: NaiveDate, summaries_dir: &Path) -> bool {
    candidate_exists(&summaries_dir.join("yearly"), &yearly_summary_candidates(date))
}

/// Iterates every day strictly after `last_date` through `current_date` inclusive, calling
/// `is_boundary` for each; returns true as soon as one boundary day's summary is missing.
fn boundary_crossed(
    last_date: NaiveDate,
    current_date: NaiveDate,
    is_boundary: impl Fn(NaiveDate) -> bool,
    exists: impl Fn(NaiveDate, &Path) -> bool,
    summaries_dir: &Path,
) -> bool {
    let mut check_date = last_date + Duration::days(1);
    while check_date <= current_date {
        if is_boundary(check_date) && !exists(check_date - Duration::days(1), summaries_dir) {
            return true;
        }
        check_date += Duration::days(1);
    }
    false
}

/// Determines which period summaries should be generated for `commit_date`, optionally
/// scanning any gap back to `last_commit_date` for boundaries that a delayed commit skipped.
pub fn should_generate_period_summaries(
    commit_date: NaiveDate,
    summaries_dir: &Path,
    last_commit_date: Option<NaiveDate>,
) -> PendingSummaries {
    let mut result = PendingSummaries::default();

    if let Some(last_date) = last_commit_date {
        result.weekly = boundary_crossed(
            last_date,
            commit_date,
            |d| d.weekday() == Weekday::Mon,
            weekly_summary_exists,
            summaries_dir,
        );
        result.monthly = boundary_crossed(
            last_date,
            commit_date,
            |d| d.day() == 1,
            monthly_summary_exists,
            summaries_dir,
        );
        result.quarterly = boundary_crossed(
            last_date,
            commit_date,
            |d| matches!(d.month(), 1 | 4 | 7 | 10) && d.day() == 1,
            quarterly_summary_exists,
            summaries_dir,
        );
        result.yearly = boundary_crossed(
            last_date,
            commit_date,
            |d| d.month() == 1 && d.day() == 1,
            yearly_summary_exists,
            summaries_dir,
        );
        return result;
    }

    if commit_date.weekday() == Weekday::Mon {
        let previous_week_end = commit_date - Duration::days(1);
        result.weekly = !weekly_summary_exists(previous_week_end, summaries_dir);
    }
    if commit_date.day() == 1 {
        let previous_month_end = commit_date - Duration::days(1);
        result.monthly = !monthly_summary_exists(previous_month_end, summaries_dir);
    }
    if matches!(commit_date.month(), 1 | 4 | 7 | 10) && commit_date.day() == 1 {
        let previous_quarter_end = commit_date - Duration::days(1);
        result.quarterly = !quarterly_summary_exists(previous_quarter_end, summaries_dir);
    }
    if commit_date.month() == 1 && commit_date.day() == 1 {
        let previous_year_end = commit_date - Duration::days(1);
        result.yearly = !yearly_summary_exists(previous_year_end, summaries_dir);
    }

    result
}

/// Extracts `YYYY-MM-DD` from a journal filename of the form `<date>-journal.md`.
pub fn extract_date_from_journal_filename(filename: &str) -> Option<NaiveDate> {
    if !filename.ends_with("-journal.md") {
        return None;
    }
    let date_str = &filename[..10.min(filename.len())];
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

/// Scans `journal_dir` for the most recent journal entry strictly before `new_file_date` whose
/// daily summary doesn't exist yet, per the file-creation-based trigger (spec §4.8).
pub fn should_generate_daily_summary(
    new_file_date: NaiveDate,
    journal_dir: &Path,
    summaries_dir: &Path,
) -> Option<NaiveDate> {
    let entries = std::fs::read_dir(journal_dir).ok()?;

    let most_recent = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            extract_date_from_journal_filename(&name)
        })
        .filter(|d| *d < new_file_date)
        .max()?;

    let summary_path = summaries_dir.join(super::filenames::daily_summary_filename(most_recent));
    if summary_path.exists() {
        None
    } else {
        Some(most_recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn monday_commit_triggers_weekly_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let monday = date(2025, 1, 6);
        let result = should_generate_period_summaries(monday, dir.path(), None);
        assert!(result.weekly);
        assert!(!result.monthly);
    }

    #[test]
    fn first_of_month_triggers_monthly() {
        let dir = tempfile::tempdir().unwrap();
        let result = should_generate_period_summaries(date(2025, 3, 1), dir.path(), None);
        assert!(result.monthly);
    }

    #[test]
    fn jan_first_triggers_all_periods() {
        let dir = tempfile::tempdir().unwrap();
        let result = should_generate_period_summaries(date(2025, 1, 1), dir.path(), None);
        assert!(result.monthly);
        assert!(result.quarterly);
        assert!(result.yearly);
    }

    #[test]
    fn gap_spanning_a_monday_detects_weekly_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let last = date(2025, 1, 3); // Friday
        let current = date(2025, 1, 8); // Wednesday, after Monday Jan 6
        let result = should_generate_period_summaries(current, dir.path(), Some(last));
        assert!(result.weekly);
    }

    #[test]
    fn existing_summary_suppresses_trigger() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("monthly")).unwrap();
        std::fs::write(dir.path().join("monthly").join("2025-02.md"), "x").unwrap();
        let result = should_generate_period_summaries(date(2025, 3, 1), dir.path(), None);
        assert!(!result.monthly);
    }

    #[test]
    fn extracts_date_from_journal_filename() {
        assert_eq!(
            extract_date_from_journal_filename("2025-01-06-journal.md"),
            Some(date(2025, 1, 6))
        );
        assert_eq!(extract_date_from_journal_filename("notes.txt"), None);
    }

    #[test]
    fn daily_summary_trigger_finds_most_recent_unsummarized() {
        let journal_dir = tempfile::tempdir().unwrap();
        let summaries_dir = tempfile::tempdir().unwrap();
        std::fs::write(journal_dir.path().join("2025-01-05-journal.md"), "x").unwrap();
        std::fs::write(journal_dir.path().join("2025-01-06-journal.md"), "x").unwrap();

        let result = should_generate_daily_summary(date(2025, 1, 7), journal_dir.path(), summaries_dir.path());
        assert_eq!(result, Some(date(2025, 1, 6)));
    }
}
