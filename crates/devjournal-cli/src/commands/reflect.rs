//! `devjournal reflect`: appends a manual reflection to a day's journal entry.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;

use devjournal_core::{config, journal};

use crate::output::print_success;

#[derive(Args)]
pub struct ReflectArgs {
    /// Reflection text
    text: String,

    /// Repository root (defaults to the current directory)
    #[arg(long)]
    repo: Option<String>,

    /// Date to attach the reflection to, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<String>,
}

pub fn execute(args: ReflectArgs, quiet: bool) -> Result<()> {
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

    let path = journal::add_reflection(&journal_root, date, &args.text)?;
    print_success(&format!("reflection added to {}", path.display()), quiet);
    Ok(())
}
