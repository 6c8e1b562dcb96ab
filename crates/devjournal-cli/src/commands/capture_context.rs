//! `devjournal capture-context`: records an AI knowledge dump as a journal entry.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;

use devjournal_core::{config, journal};

use crate::output::print_success;

#[derive(Args)]
pub struct CaptureContextArgs {
    /// Captured text
    text: String,

    /// Repository root (defaults to the current directory)
    #[arg(long)]
    repo: Option<String>,

    /// Date to attach the capture to, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<String>,
}

pub fn execute(args: CaptureContextArgs, quiet: bool) -> Result<()> {
    let repo_path = args
        .repo
        .map(PathBuf::from)
        .unwrap_or(std::env::current_dir()?);
    let cfg = config::load_config(&repo_path).unwrap_or_default();
    let journal_root = repo_path.join(&cfg.journal.path);

    let date = match args.date {
        Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .context("invalid --date, expected YYYY-MM-DD")?,
        None => chrono::Local::now().date_naive(),
    };

    let path = journal::capture_context(&journal_root, date, &args.text)?;
    print_success(&format!("captured context written to {}", path.display()), quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_writes_capture_to_requested_date() {
        let dir = tempfile::tempdir().unwrap();
        let args = CaptureContextArgs {
            text: "explained the hook worker's degrade-and-continue design".to_string(),
            repo: Some(dir.path().to_string_lossy().into_owned()),
            date: Some("2026-01-15".to_string()),
        };
        execute(args, true).unwrap();

        let path = dir.path().join("journal/daily/2026-01-15-journal.md");
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("explained the hook worker's degrade-and-continue design"));
    }

    #[test]
    fn execute_rejects_malformed_date() {
        let dir = tempfile::tempdir().unwrap();
        let args = CaptureContextArgs {
            text: "x".to_string(),
            repo: Some(dir.path().to_string_lossy().into_owned()),
            date: Some("15/01/2026".to_string()),
        };
        assert!(execute(args, true).is_err());
    }
}
