pub mod generate;
pub mod model;
pub mod previous_entry;
pub mod writer;

pub use generate::generate_sections;
pub use model::{DiscussionNote, EntryKind, JournalSections, ToneMood};
pub use previous_entry::get_previous_journal_entry;
pub use writer::{add_reflection, append_journal_entry, capture_context, journal_file_path};
