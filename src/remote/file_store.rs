// src/remote/file_store.rs
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{MemoryNoteStore, NoteStore, RemoteResult};
use crate::error::Result;
use crate::model::{GetNoteOptions, Note, NoteFilter, NotesPage, SummarySpec, Tag};

/// On-disk layout of an exported account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteArchive {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// A note store backed by a JSON export of the account.
///
/// Updates are kept in memory until [`FileNoteStore::save`] is called.
#[derive(Debug)]
pub struct FileNoteStore {
    path: PathBuf,
    inner: MemoryNoteStore,
}

impl FileNoteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let archive: NoteArchive = serde_json::from_str(&data)?;
        tracing::debug!(
            path = %path.display(),
            tags = archive.tags.len(),
            notes = archive.notes.len(),
            "Opened note archive"
        );
        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryNoteStore::new(archive.tags, archive.notes),
        })
    }

    /// Write the current state back to the archive file.
    pub async fn save(&self) -> Result<()> {
        let archive = NoteArchive {
            tags: self.inner.tags().to_vec(),
            notes: self.inner.notes().await,
        };
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&archive)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl NoteStore for FileNoteStore {
    async fn list_tags(&self) -> RemoteResult<Vec<Tag>> {
        self.inner.list_tags().await
    }

    async fn find_note_summaries(
        &self,
        filter: &NoteFilter,
        offset: usize,
        max_count: usize,
        spec: SummarySpec,
    ) -> RemoteResult<NotesPage> {
        self.inner.find_note_summaries(filter, offset, max_count, spec).await
    }

    async fn get_note(&self, guid: &str, options: GetNoteOptions) -> RemoteResult<Note> {
        self.inner.get_note(guid, options).await
    }

    async fn update_note(&self, note: &Note) -> RemoteResult<Note> {
        self.inner.update_note(note).await
    }
}
