// src/remote/memory.rs
use std::cmp::Ordering;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{NoteStore, RemoteError, RemoteResult, USER_NOTES_MAX};
use crate::model::{
    GetNoteOptions, Note, NoteFilter, NoteSortOrder, NoteSummary, NotesPage, SummarySpec, Tag,
};

/// A note store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    tags: Vec<Tag>,
    notes: Mutex<Vec<Note>>,
}

impl MemoryNoteStore {
    pub fn new(tags: Vec<Tag>, notes: Vec<Note>) -> Self {
        Self {
            tags,
            notes: Mutex::new(notes),
        }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Snapshot of every note, in insertion order.
    pub async fn notes(&self) -> Vec<Note> {
        self.notes.lock().await.clone()
    }

    #[cfg(test)]
    pub async fn note(&self, guid: &str) -> Option<Note> {
        self.notes.lock().await.iter().find(|n| n.guid == guid).cloned()
    }
}

fn matches_filter(note: &Note, filter: &NoteFilter) -> bool {
    match &filter.words {
        Some(words) => note.content.to_lowercase().contains(&words.to_lowercase()),
        None => true,
    }
}

fn compare(a: &Note, b: &Note, order: NoteSortOrder) -> Ordering {
    let primary = match order {
        NoteSortOrder::Title => a.title.cmp(&b.title),
        NoteSortOrder::Created => a.created.cmp(&b.created),
        NoteSortOrder::Updated => a.updated.cmp(&b.updated),
    };
    // Ties broken by guid so paging is stable.
    primary.then_with(|| a.guid.cmp(&b.guid))
}

fn project(note: &Note, spec: SummarySpec) -> NoteSummary {
    NoteSummary {
        guid: note.guid.clone(),
        title: if spec.include_title { note.title.clone() } else { String::new() },
        created: if spec.include_created { note.created } else { 0 },
        updated: if spec.include_updated { note.updated } else { 0 },
        tag_guids: if spec.include_tag_guids {
            note.tag_guids.clone()
        } else {
            Vec::new()
        },
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list_tags(&self) -> RemoteResult<Vec<Tag>> {
        Ok(self.tags.clone())
    }

    async fn find_note_summaries(
        &self,
        filter: &NoteFilter,
        offset: usize,
        max_count: usize,
        spec: SummarySpec,
    ) -> RemoteResult<NotesPage> {
        if max_count == 0 || max_count > USER_NOTES_MAX {
            return Err(RemoteError::Service(format!(
                "maxNotes must be between 1 and {}, got {}",
                USER_NOTES_MAX, max_count
            )));
        }

        let notes = self.notes.lock().await;
        let mut matching: Vec<&Note> = notes.iter().filter(|n| matches_filter(n, filter)).collect();
        matching.sort_by(|a, b| compare(a, b, filter.order));

        let total_notes = matching.len();
        let summaries = matching
            .into_iter()
            .skip(offset)
            .take(max_count)
            .map(|n| project(n, spec))
            .collect();

        Ok(NotesPage {
            summaries,
            start_index: offset,
            total_notes,
        })
    }

    async fn get_note(&self, guid: &str, options: GetNoteOptions) -> RemoteResult<Note> {
        let notes = self.notes.lock().await;
        let mut note = notes
            .iter()
            .find(|n| n.guid == guid)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(guid.to_string()))?;
        if !options.with_content {
            note.content.clear();
        }
        Ok(note)
    }

    async fn update_note(&self, note: &Note) -> RemoteResult<Note> {
        if let Some(unknown) = note
            .tag_guids
            .iter()
            .find(|g| !self.tags.iter().any(|t| &t.guid == *g))
        {
            return Err(RemoteError::Service(format!("Unknown tag guid: {}", unknown)));
        }

        let mut notes = self.notes.lock().await;
        let stored = notes
            .iter_mut()
            .find(|n| n.guid == note.guid)
            .ok_or_else(|| RemoteError::NotFound(note.guid.clone()))?;

        stored.title = note.title.clone();
        stored.content = note.content.clone();
        stored.created = note.created;
        stored.updated = note.updated;
        stored.tag_guids = note.tag_guids.clone();
        Ok(stored.clone())
    }
}
