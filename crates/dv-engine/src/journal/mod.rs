//! A timestamped record of everything that happened in a run.

pub mod entry;
pub mod log;

pub use entry::JournalEntry;
pub use log::Journal;
