pub mod filenames;
pub mod trigger;

pub use trigger::{
    extract_date_from_journal_filename, should_generate_daily_summary,
    should_generate_period_summaries, PendingSummaries,
};
