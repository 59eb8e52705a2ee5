mod filter;
mod note;

pub use filter::{GetNoteOptions, NoteFilter, NoteSortOrder, NotesPage, SummarySpec};
pub use note::{Note, NoteSummary};

use serde::{Deserialize, Serialize};

/// Identifier the note store assigns to notes and tags.
pub type Guid = String;

/// A tag as listed by the note store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub guid: Guid,
    pub name: String,
}

impl Tag {
    pub fn new(guid: impl Into<Guid>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
        }
    }
}
