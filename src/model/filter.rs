// src/model/filter.rs
use serde::{Deserialize, Serialize};

use super::NoteSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteSortOrder {
    #[default]
    Title,
    Created,
    Updated,
}

impl std::fmt::Display for NoteSortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteSortOrder::Title => write!(f, "title"),
            NoteSortOrder::Created => write!(f, "created"),
            NoteSortOrder::Updated => write!(f, "updated"),
        }
    }
}

/// Which notes the catalog listing returns, and in what order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFilter {
    /// Only notes whose content contains this text.
    pub words: Option<String>,
    pub order: NoteSortOrder,
}

impl NoteFilter {
    pub fn containing(words: impl Into<String>) -> Self {
        Self {
            words: Some(words.into()),
            order: NoteSortOrder::Title,
        }
    }
}

/// Projection of the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SummarySpec {
    pub include_title: bool,
    pub include_created: bool,
    pub include_updated: bool,
    pub include_tag_guids: bool,
}

impl SummarySpec {
    pub fn all() -> Self {
        Self {
            include_title: true,
            include_created: true,
            include_updated: true,
            include_tag_guids: true,
        }
    }
}

/// What a full-note fetch brings back besides the metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GetNoteOptions {
    pub with_content: bool,
    pub with_resources: bool,
    pub with_resource_data: bool,
    pub with_shared_notes: bool,
}

impl GetNoteOptions {
    /// Content only; attachments and sharing info are never needed here.
    pub fn content_only() -> Self {
        Self {
            with_content: true,
            ..Self::default()
        }
    }
}

/// One page of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesPage {
    pub summaries: Vec<NoteSummary>,
    pub start_index: usize,
    pub total_notes: usize,
}
