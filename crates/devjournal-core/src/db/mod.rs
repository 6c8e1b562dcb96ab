//! Cursor IDE SQLite state access: discovery of candidate database files (§4.2) and
//! extraction of chat messages from them (§4.5).

pub mod discovery;
pub mod messages;

pub use discovery::find_candidate_databases;
pub use messages::{assemble_messages, ChatMessage, Speaker};
