//! The note store the correction pass runs against.
//!
//! [`NoteStore`] mirrors the four calls the pass needs from the remote
//! service. [`MemoryNoteStore`] and [`FileNoteStore`] implement it locally.

mod file_store;
mod memory;

pub use file_store::{FileNoteStore, NoteArchive};
pub use memory::MemoryNoteStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{GetNoteOptions, Note, NoteFilter, NotesPage, SummarySpec, Tag};

/// Largest page the catalog listing will return.
pub const USER_NOTES_MAX: usize = 250;

/// Errors reported by the note store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The service refuses further calls for `duration_secs` seconds.
    #[error("Rate limit reached, retry in {duration_secs}s")]
    RateLimited { duration_secs: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Service(String),
}

impl RemoteError {
    /// Cooldown requested by the service, if this is a rate limit.
    pub fn rate_limit_duration(&self) -> Option<u64> {
        match self {
            RemoteError::RateLimited { duration_secs } => Some(*duration_secs),
            _ => None,
        }
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All tags of the account.
    async fn list_tags(&self) -> RemoteResult<Vec<Tag>>;

    /// One page of the catalog, `max_count` summaries starting at `offset`.
    async fn find_note_summaries(
        &self,
        filter: &NoteFilter,
        offset: usize,
        max_count: usize,
        spec: SummarySpec,
    ) -> RemoteResult<NotesPage>;

    /// Fetch a full note.
    async fn get_note(&self, guid: &str, options: GetNoteOptions) -> RemoteResult<Note>;

    /// Replace the mutable fields of an existing note.
    async fn update_note(&self, note: &Note) -> RemoteResult<Note>;
}
