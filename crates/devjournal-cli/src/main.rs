//! devjournal CLI
//!
//! Generates an engineering journal from local git commits and the chat history of a
//! developer's local AI-IDE, driven by a git post-commit hook.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "devjournal")]
#[command(author, version, about = "Engineering journal generator driven by git commits and local AI-IDE chat history", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the per-commit journal pipeline against HEAD (invoked by the installed git hook)
    Hook(commands::hook::HookArgs),

    /// Create `.devjournalrc.yaml` and the journal directory in a repository
    Init(commands::init::InitArgs),

    /// Install the post-commit hook that invokes `devjournal hook`
    InstallHook(commands::install_hook::InstallHookArgs),

    /// Append a manual reflection to a day's journal entry
    Reflect(commands::reflect::ReflectArgs),

    /// Record an AI knowledge dump as a journal entry
    CaptureContext(commands::capture_context::CaptureContextArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `hook` installs its own commit-timestamped file logger; every other command logs to
    // stderr via env_logger the way the rest of this CLI's ancestry does.
    if !matches!(cli.command, Commands::Hook(_)) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Hook(args) => commands::hook::execute(args, cli.quiet).await,
        Commands::Init(args) => commands::init::execute(args, cli.quiet),
        Commands::InstallHook(args) => commands::install_hook::execute(args, cli.quiet),
        Commands::Reflect(args) => commands::reflect::execute(args, cli.quiet),
        Commands::CaptureContext(args) => commands::capture_context::execute(args, cli.quiet),
    }
}
