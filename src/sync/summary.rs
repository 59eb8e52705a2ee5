// src/sync/summary.rs
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened to a single fetched note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteOutcome {
    /// Timestamps were set to `date` and the completion tag applied
    /// (or would have been, on a dry run).
    Updated { date: DateTime<Utc> },
    /// No embedded date; the note stays eligible for a later pass.
    NoDate,
    /// A fetch or update was rate limited and the cooldown slept through.
    RateLimited { waited: Duration },
}

/// Counters for one correction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pages: u32,
    pub seen: u64,
    pub skipped_done: u64,
    pub updated: u64,
    pub no_date: u64,
    pub rate_limited: u64,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &NoteOutcome) {
        match outcome {
            NoteOutcome::Updated { .. } => self.updated += 1,
            NoteOutcome::NoDate => self.no_date += 1,
            NoteOutcome::RateLimited { .. } => self.rate_limited += 1,
        }
    }

    /// Notes that were fetched, whatever the outcome.
    pub fn fetched(&self) -> u64 {
        self.updated + self.no_date + self.rate_limited
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = if self.dry_run { "would update" } else { "updated" };
        write!(
            f,
            "{} notes in {} pages: {} {}, {} already done, {} without date, {} rate limited",
            self.seen, self.pages, verb, self.updated, self.skipped_done, self.no_date, self.rate_limited
        )
    }
}
