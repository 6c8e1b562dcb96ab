//! Canonical and legacy filenames for period summary files (spec §4.8 / §6).
//!
//! Each period has one canonical write format plus a handful of legacy read-compatible
//! alternates — callers writing a new summary always use the canonical name; callers checking
//! whether one already exists accept any alternate.

use chrono::{Datelike, NaiveDate};

pub fn daily_summary_filename(date: NaiveDate) -> String {
    format!("{}-summary.md", date.format("%Y-%m-%d"))
}

pub fn weekly_summary_candidates(monday: NaiveDate) -> Vec<String> {
    let week_num = monday.iso_week().week();
    vec![
        format!("{}-week{}.md", monday.format("%Y-%m"), week_num),
        format!("{}-week{:02}.md", monday.format("%Y"), week_num),
    ]
}

pub fn monthly_summary_candidates(date: NaiveDate) -> Vec<String> {
    vec![
        format!("{}.md", date.format("%Y-%m")),
        format!("{}-monthly.md", date.format("%Y-%m")),
    ]
}

pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

pub fn quarterly_summary_candidates(date: NaiveDate) -> Vec<String> {
    let q = quarter_of(date);
    vec![
        format!("{}-Q{}.md", date.format("%Y"), q),
        format!("{}-quarter{}.md", date.format("%Y"), q),
    ]
}

pub fn yearly_summary_candidates(date: NaiveDate) -> Vec<String> {
    vec![
        format!("{}.md", date.format("%Y")),
        format!("{}-yearly.md", date.format("%Y")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_filename_format() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(daily_summary_filename(d), "2025-01-06-summary.md");
    }

    #[test]
    fn quarter_of_boundaries() {
        assert_eq!(quarter_of(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()), 1);
        assert_eq!(quarter_of(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()), 2);
        assert_eq!(quarter_of(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()), 3);
        assert_eq!(quarter_of(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()), 4);
    }

    #[test]
    fn yearly_candidates_include_both_formats() {
        let d = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let candidates = yearly_summary_candidates(d);
        assert!(candidates.contains(&"2025.md".to_string()));
        assert!(candidates.contains(&"2025-yearly.md".to_string()));
    }
}
