//! `devjournal hook`: entry point invoked by the installed git post-commit hook.
//!
//! Always exits successfully — the hook worker degrades at every stage rather than aborting.

use anyhow::Result;
use clap::Args;
use log::LevelFilter;
use std::path::PathBuf;

use devjournal_core::hook_logger::{hook_log_path, HookLogger};

use crate::output::print_info;

#[derive(Args)]
pub struct HookArgs {
    /// Repository root to run against (defaults to the current directory)
    #[arg(long)]
    repo: Option<String>,
}

pub async fn execute(args: HookArgs, quiet: bool) -> Result<()> {
    let repo_path = args
        .repo
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let logger: Option<&'static HookLogger> = match HookLogger::init(hook_log_path(&repo_path)) {
        Ok(logger) => {
            let logger: &'static HookLogger = Box::leak(Box::new(logger));
            let _ = log::set_logger(logger);
            log::set_max_level(LevelFilter::Info);
            Some(logger)
        }
        Err(_) => None,
    };

    let outcome = devjournal_core::run_hook(&repo_path, logger).await;

    if let Some(reason) = &outcome.skipped_reason {
        print_info(&format!("devjournal: skipped ({reason})"), quiet);
    } else {
        print_info(
            &format!(
                "devjournal: journal entry written = {}, pending summaries = {}",
                outcome.journal_entry_written,
                outcome.period_summaries.any()
            ),
            quiet,
        );
    }

    Ok(())
}
