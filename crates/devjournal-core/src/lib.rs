//! # devjournal-core
//!
//! Turns a developer's local AI-IDE chat history into an engineering journal, one commit at a
//! time. This crate provides every subsystem the `devjournal` CLI's `hook` command wires
//! together:
//!
//! - Platform Locator / Database Discovery / Workspace Matcher (`platform`, `db::discovery`,
//!   `workspace`) — find and pick the right Cursor SQLite state database for this repo.
//! - Time Window Resolver / Message Assembler (`timewindow`, `db::messages`) — bound and read
//!   the chat messages that could plausibly belong to a commit.
//! - Boundary Filter (`boundary`) — an AI call that decides where "this commit's conversation"
//!   actually starts.
//! - AI Invoker (`ai`) — the single place every AI provider call goes through.
//! - File Writers / Summary Trigger (`journal`, `summary`) — render and append the journal entry,
//!   then decide whether a period summary boundary was crossed.
//! - Hook Worker (`hook`) — orchestrates all of the above into the end-to-end per-commit pipeline.

pub mod ai;
pub mod boundary;
pub mod config;
pub mod db;
pub mod error;
pub mod gitctx;
pub mod hook;
pub mod hook_logger;
pub mod journal;
pub mod platform;
pub mod summary;
pub mod timewindow;
pub mod workspace;

pub use error::{Error, Result};
pub use hook::{run as run_hook, HookOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}
