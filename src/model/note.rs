// src/model/note.rs
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::Guid;

/// Catalog entry for a note: enough to decide whether to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub guid: Guid,
    pub title: String,
    /// Milliseconds since the Unix epoch.
    pub created: i64,
    /// Milliseconds since the Unix epoch.
    pub updated: i64,
    #[serde(default)]
    pub tag_guids: Vec<Guid>,
}

impl NoteSummary {
    pub fn has_tag(&self, tag_guid: &str) -> bool {
        self.tag_guids.iter().any(|g| g == tag_guid)
    }
}

/// A full note as returned by the note store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub guid: Guid,
    pub title: String,
    /// Note body, markup included.
    #[serde(default)]
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub created: i64,
    /// Milliseconds since the Unix epoch.
    pub updated: i64,
    #[serde(default)]
    pub tag_guids: Vec<Guid>,
}

impl Note {
    pub fn new(guid: impl Into<Guid>, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            guid: guid.into(),
            title: title.into(),
            content: content.into(),
            created: now,
            updated: now,
            tag_guids: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag_guid: &str) -> bool {
        self.tag_guids.iter().any(|g| g == tag_guid)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created).single()
    }

    /// Set both timestamps to `date` and mark the note with `tag_guid`.
    pub fn apply_corrected_date(&mut self, date: DateTime<Utc>, tag_guid: &str) {
        let millis = date.timestamp_millis();
        self.created = millis;
        self.updated = millis;
        if !self.has_tag(tag_guid) {
            self.tag_guids.push(tag_guid.to_string());
        }
    }
}
