//! Domain types and the error taxonomy shared by every captains_log crate.

pub mod domain;
pub mod error;

pub use domain::{check_collection, Entry, EntryId, EntryKind, ENTRIES_STORAGE_KEY};
pub use error::{LogError, Result};
