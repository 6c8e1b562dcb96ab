//! `devjournal init`: creates `.devjournalrc.yaml` and the journal directory in a repository.
//!
//! Only the base journal directory is created here — every subdirectory (`daily/`,
//! `summaries/<period>/`) is created on demand by the file writers.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use crate::output::{print_error, print_success};

#[derive(Args)]
pub struct InitArgs {
    /// Repository root to initialize (defaults to the current directory)
    #[arg(long)]
    repo: Option<String>,
}

const DEFAULT_CONFIG: &str = "\
journal:
  path: journal/
  auto_generate: true
  include_terminal: true
  include_chat: true
  include_mood: true
git:
  exclude_patterns:
    - journal/**
    - .devjournalrc.yaml
ai:
  provider: openai
  model: gpt-4o-mini
  openai_api_key: \"\"
telemetry:
  enabled: false
  service_name: devjournal
";

pub fn execute(args: InitArgs, quiet: bool) -> Result<()> {
    let repo_path = args
        .repo
        .map(PathBuf::from)
        .unwrap_or(std::env::current_dir()?);

    if !repo_path.join(".git").is_dir() {
        bail!("not a git repository: {}", repo_path.display());
    }

    let config_path = repo_path.join(".devjournalrc.yaml");
    let journal_path = repo_path.join("journal");

    if config_path.exists() && journal_path.is_dir() {
        print_error("journal already initialized (config and journal directory both exist)");
        return Ok(());
    }

    if config_path.exists() {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_millis();
        let backup_path = repo_path.join(format!(".devjournalrc.yaml.bak{millis}"));
        std::fs::copy(&config_path, &backup_path)?;
    } else {
        std::fs::write(&config_path, DEFAULT_CONFIG)?;
    }

    std::fs::create_dir_all(&journal_path)?;

    print_success(
        &format!("initialized devjournal in {}", repo_path.display()),
        quiet,
    );
    Ok(())
}
