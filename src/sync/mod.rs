//! The correction pass over the note catalog.
//!
//! The completion tag is the only checkpoint: a note carrying it is never
//! fetched again, so a pass can be interrupted and rerun at any point.

mod summary;

pub use summary::{NoteOutcome, RunSummary};

use tracing::{debug, error, info};

use crate::config::SyncConfig;
use crate::error::{RedateError, Result};
use crate::extract;
use crate::invoker::{CooldownAndSkip, Invocation, Propagate, RateLimitedInvoker};
use crate::model::{GetNoteOptions, NoteFilter, NoteSummary, SummarySpec, Tag};
use crate::remote::NoteStore;

pub struct SyncOrchestrator<'a, S: NoteStore + ?Sized> {
    store: &'a S,
    config: SyncConfig,
    /// Tag lookup and catalog pages.
    catalog: RateLimitedInvoker<Propagate>,
    /// Note fetches and updates.
    per_note: RateLimitedInvoker<CooldownAndSkip>,
}

impl<'a, S: NoteStore + ?Sized> SyncOrchestrator<'a, S> {
    /// Fails with [`RedateError::Config`] if `config` does not validate.
    pub fn new(store: &'a S, config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let per_note = RateLimitedInvoker::new(CooldownAndSkip {
            margin: config.cooldown_margin(),
        });
        Ok(Self {
            store,
            config,
            catalog: RateLimitedInvoker::new(Propagate),
            per_note,
        })
    }

    /// Look up the completion tag by name.
    pub async fn resolve_completion_tag(&self) -> Result<Tag> {
        let tags = self
            .catalog
            .invoke("list_tags", self.store.list_tags())
            .await?;
        tags.into_iter()
            .find(|t| t.name == self.config.tag_name)
            .ok_or_else(|| RedateError::TagNotFound(self.config.tag_name.clone()))
    }

    /// Run one correction pass over every catalog page.
    pub async fn run(&self) -> Result<RunSummary> {
        let tag = self.resolve_completion_tag().await?;
        let filter = NoteFilter::containing(self.config.filter_words.as_str());

        let mut summary = RunSummary {
            dry_run: self.config.dry_run,
            ..RunSummary::default()
        };
        let mut offset = 0;

        loop {
            info!(offset, order = %filter.order, "Requesting notes");
            let page = self
                .catalog
                .invoke(
                    "find_note_summaries",
                    self.store.find_note_summaries(
                        &filter,
                        offset,
                        self.config.page_size,
                        SummarySpec::all(),
                    ),
                )
                .await?;
            summary.pages += 1;
            info!(
                count = page.summaries.len(),
                start = page.start_index,
                total = page.total_notes,
                "Got notes"
            );

            if page.summaries.is_empty() || offset >= page.total_notes {
                info!("No more notes");
                break;
            }

            for note_summary in &page.summaries {
                self.visit(note_summary, &tag, &mut summary).await?;
            }

            offset += page.summaries.len();
            if offset >= page.total_notes {
                break;
            }
        }

        info!(%summary, "Correction pass finished");
        Ok(summary)
    }

    async fn visit(&self, note_summary: &NoteSummary, tag: &Tag, summary: &mut RunSummary) -> Result<()> {
        summary.seen += 1;
        if note_summary.has_tag(&tag.guid) {
            debug!(title = %note_summary.title, "Skipping done note");
            summary.skipped_done += 1;
            return Ok(());
        }

        let outcome = self.process_note(&note_summary.guid, tag).await?;
        summary.record(&outcome);

        tokio::time::sleep(self.config.pause_after(summary.fetched() as usize)).await;
        Ok(())
    }

    /// Fetch one note, extract its date and write the correction back.
    pub async fn process_note(&self, guid: &str, tag: &Tag) -> Result<NoteOutcome> {
        let mut note = match self
            .per_note
            .invoke("get_note", self.store.get_note(guid, GetNoteOptions::content_only()))
            .await?
        {
            Invocation::Completed(note) => note,
            Invocation::CooledDown { waited } => return Ok(NoteOutcome::RateLimited { waited }),
        };

        let date = extract::extract(&note.content).map_err(|e| {
            error!(title = %note.title, error = %e, "Unreadable date");
            e
        })?;
        let Some(date) = date else {
            info!(title = %note.title, "No date found");
            return Ok(NoteOutcome::NoDate);
        };

        info!(
            title = %note.title,
            created = ?note.created_at(),
            corrected = %date,
            "Changing creation date"
        );
        if self.config.dry_run {
            return Ok(NoteOutcome::Updated { date });
        }

        note.apply_corrected_date(date, &tag.guid);
        match self.per_note.invoke("update_note", self.store.update_note(&note)).await? {
            Invocation::Completed(_) => Ok(NoteOutcome::Updated { date }),
            Invocation::CooledDown { waited } => Ok(NoteOutcome::RateLimited { waited }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Note, NotesPage};
    use crate::remote::{MemoryNoteStore, RemoteError, RemoteResult};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    const DONE: &str = "tag-done";

    /// Memory store that records calls and can be told to fail.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryNoteStore,
        page_requests: Mutex<Vec<(usize, usize)>>,
        gets: Mutex<Vec<String>>,
        updates: Mutex<Vec<String>>,
        rate_limit_get: Mutex<HashMap<String, u64>>,
        rate_limit_update: Mutex<HashMap<String, u64>>,
        rate_limit_pages: Mutex<Option<u64>>,
        vanished: HashSet<String>,
    }

    impl RecordingStore {
        fn new(notes: Vec<Note>) -> Self {
            Self {
                inner: MemoryNoteStore::new(
                    vec![Tag::new("tag-other", "inbox"), Tag::new(DONE, "done")],
                    notes,
                ),
                ..Self::default()
            }
        }

        fn gets(&self) -> Vec<String> {
            self.gets.lock().unwrap().clone()
        }

        fn updates(&self) -> Vec<String> {
            self.updates.lock().unwrap().clone()
        }

        fn page_requests(&self) -> Vec<(usize, usize)> {
            self.page_requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NoteStore for RecordingStore {
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
            self.page_requests.lock().unwrap().push((offset, max_count));
            if let Some(duration_secs) = self.rate_limit_pages.lock().unwrap().take() {
                return Err(RemoteError::RateLimited { duration_secs });
            }
            self.inner.find_note_summaries(filter, offset, max_count, spec).await
        }

        async fn get_note(&self, guid: &str, options: GetNoteOptions) -> RemoteResult<Note> {
            self.gets.lock().unwrap().push(guid.to_string());
            if let Some(duration_secs) = self.rate_limit_get.lock().unwrap().remove(guid) {
                return Err(RemoteError::RateLimited { duration_secs });
            }
            if self.vanished.contains(guid) {
                return Err(RemoteError::NotFound(guid.to_string()));
            }
            self.inner.get_note(guid, options).await
        }

        async fn update_note(&self, note: &Note) -> RemoteResult<Note> {
            self.updates.lock().unwrap().push(note.guid.clone());
            if let Some(duration_secs) = self.rate_limit_update.lock().unwrap().remove(&note.guid) {
                return Err(RemoteError::RateLimited { duration_secs });
            }
            self.inner.update_note(note).await
        }
    }

    fn dated(guid: &str, title: &str, date: &str) -> Note {
        let mut note = Note::new(
            guid,
            title,
            format!("<div><b>Date Received:</b> {}<br/></div><div>body</div>", date),
        );
        note.created = 1_600_000_000_000;
        note.updated = 1_600_000_000_000;
        note
    }

    fn undated(guid: &str, title: &str) -> Note {
        // Matches the catalog filter but has no parsable layout.
        Note::new(guid, title, "<div>Date Received: unknown</div>")
    }

    fn config(page_size: usize) -> SyncConfig {
        SyncConfig {
            page_size,
            ..SyncConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_dated_notes_and_tags_them() {
        let store = RecordingStore::new(vec![
            dated("a", "Alpha", "5 января 2014 14:30"),
            undated("b", "Bravo"),
            dated("c", "Charlie", "17 Mar 2012 09:05"),
        ]);

        let summary = SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap();

        assert_eq!(summary.seen, 3);
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.no_date, 1);
        assert_eq!(summary.pages, 1);

        let alpha = store.inner.note("a").await.unwrap();
        let expected = Utc.with_ymd_and_hms(2014, 1, 5, 11, 30, 0).unwrap();
        assert_eq!(alpha.created, expected.timestamp_millis());
        assert_eq!(alpha.updated, expected.timestamp_millis());
        assert_eq!(alpha.tag_guids, vec![DONE.to_string()]);

        let bravo = store.inner.note("b").await.unwrap();
        assert!(bravo.tag_guids.is_empty());
        assert_eq!(store.updates(), vec!["a".to_string(), "c".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_note_is_never_fetched() {
        let mut done = dated("a", "Alpha", "5 Jan 2014 14:30");
        done.tag_guids.push(DONE.to_string());
        let store = RecordingStore::new(vec![done, dated("b", "Bravo", "6 Jan 2014 10:00")]);

        let summary = SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap();

        assert_eq!(summary.skipped_done, 1);
        assert_eq!(store.gets(), vec!["b".to_string()]);
        assert_eq!(store.updates(), vec!["b".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_writes_nothing() {
        let store = RecordingStore::new(vec![
            dated("a", "Alpha", "5 Jan 2014 14:30"),
            dated("b", "Bravo", "6 февраля 2015 г. 08:00"),
            undated("c", "Charlie"),
        ]);
        let orchestrator = SyncOrchestrator::new(&store, config(2)).unwrap();

        let first = orchestrator.run().await.unwrap();
        assert_eq!(first.updated, 2);
        let writes_after_first = store.updates().len();

        let second = orchestrator.run().await.unwrap();
        assert_eq!(second.updated, 0);
        assert_eq!(second.skipped_done, 2);
        assert_eq!(store.updates().len(), writes_after_first);
        // Only the undated note is fetched again.
        assert_eq!(&store.gets()[3..], &["c".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_requests_each_page_once() {
        let notes: Vec<Note> = (0..7)
            .map(|i| dated(&format!("n{}", i), &format!("Note {}", i), "1 Jan 2014 12:00"))
            .collect();
        let store = RecordingStore::new(notes);

        let summary = SyncOrchestrator::new(&store, config(3)).unwrap().run().await.unwrap();

        assert_eq!(store.page_requests(), vec![(0, 3), (3, 3), (6, 3)]);
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.seen, 7);

        let mut fetched = store.gets();
        fetched.sort();
        fetched.dedup();
        assert_eq!(fetched.len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pagination_exact_multiple_of_page_size() {
        let notes: Vec<Note> = (0..6).map(|i| undated(&format!("n{}", i), &format!("Note {}", i))).collect();
        let store = RecordingStore::new(notes);

        SyncOrchestrator::new(&store, config(3)).unwrap().run().await.unwrap();

        assert_eq!(store.page_requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_catalog() {
        let store = RecordingStore::new(vec![Note::new("x", "Unrelated", "groceries")]);

        let summary = SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap();

        assert_eq!(store.page_requests().len(), 1);
        assert_eq!(summary.seen, 0);
        assert!(store.gets().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_completion_tag_aborts_before_listing() {
        let store = RecordingStore::new(vec![dated("a", "Alpha", "5 Jan 2014 14:30")]);
        let cfg = SyncConfig {
            tag_name: "fixed-dates".to_string(),
            ..SyncConfig::default()
        };

        let err = SyncOrchestrator::new(&store, cfg).unwrap().run().await.unwrap_err();

        assert!(matches!(err, RedateError::TagNotFound(ref name) if name == "fixed-dates"));
        assert!(store.page_requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_fetch_skips_note_after_cooldown() {
        let store = RecordingStore::new(vec![
            dated("a", "Alpha", "5 Jan 2014 14:30"),
            dated("b", "Bravo", "6 Jan 2014 14:30"),
        ]);
        store.rate_limit_get.lock().unwrap().insert("a".to_string(), 60);
        let start = Instant::now();

        let summary = SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(70));
        assert_eq!(summary.rate_limited, 1);
        assert_eq!(summary.updated, 1);
        // Not retried within the pass.
        assert_eq!(store.gets(), vec!["a".to_string(), "b".to_string()]);
        assert!(store.inner.note("a").await.unwrap().tag_guids.is_empty());
        assert_eq!(store.updates(), vec!["b".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_update_leaves_note_untagged() {
        let store = RecordingStore::new(vec![
            dated("a", "Alpha", "5 Jan 2014 14:30"),
            dated("b", "Bravo", "6 Jan 2014 14:30"),
        ]);
        store.rate_limit_update.lock().unwrap().insert("a".to_string(), 5);

        let summary = SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap();

        assert_eq!(summary.rate_limited, 1);
        assert_eq!(summary.updated, 1);
        assert!(store.inner.note("a").await.unwrap().tag_guids.is_empty());
        assert_eq!(store.inner.note("b").await.unwrap().tag_guids, vec![DONE.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_catalog_aborts_run() {
        let store = RecordingStore::new(vec![dated("a", "Alpha", "5 Jan 2014 14:30")]);
        *store.rate_limit_pages.lock().unwrap() = Some(900);
        let start = Instant::now();

        let err = SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap_err();

        assert!(matches!(err, RedateError::RateLimited { duration_secs: 900 }));
        assert!(store.gets().is_empty());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_date_aborts_run_keeping_earlier_corrections() {
        let mut broken = Note::new("b", "Bravo", "Date Received:</b> 31 Foo 2014 14:30<br>");
        broken.created = 7;
        let store = RecordingStore::new(vec![
            dated("a", "Alpha", "5 Jan 2014 14:30"),
            broken,
            dated("c", "Charlie", "7 Jan 2014 14:30"),
        ]);

        let err = SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap_err();

        assert!(matches!(err, RedateError::DateParse { .. }));
        assert_eq!(store.inner.note("a").await.unwrap().tag_guids, vec![DONE.to_string()]);
        assert_eq!(store.inner.note("b").await.unwrap().created, 7);
        assert!(!store.gets().contains(&"c".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_note_is_fatal() {
        let mut store = RecordingStore::new(vec![dated("a", "Alpha", "5 Jan 2014 14:30")]);
        store.vanished.insert("a".to_string());

        let err = SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap_err();

        assert!(matches!(err, RedateError::NoteNotFound(ref guid) if guid == "a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_writes_nothing() {
        let store = RecordingStore::new(vec![dated("a", "Alpha", "5 Jan 2014 14:30")]);
        let cfg = SyncConfig {
            dry_run: true,
            ..SyncConfig::default()
        };

        let summary = SyncOrchestrator::new(&store, cfg).unwrap().run().await.unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.updated, 1);
        assert!(store.updates().is_empty());
        assert!(store.inner.note("a").await.unwrap().tag_guids.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_pauses_between_fetched_notes() {
        let notes: Vec<Note> = (0..10).map(|i| undated(&format!("n{}", i), &format!("Note {}", i))).collect();
        let store = RecordingStore::new(notes);
        let start = Instant::now();

        SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap();

        // Nine short pauses and one long pause on the tenth note.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(14));
        assert!(elapsed < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config_is_rejected_before_any_call() {
        let store = RecordingStore::new(vec![undated("a", "Alpha")]);
        let cfg = SyncConfig {
            long_pause_every: 0,
            ..SyncConfig::default()
        };

        let result = SyncOrchestrator::new(&store, cfg);

        assert!(matches!(result, Err(RedateError::Config(_))));
        assert!(store.page_requests().is_empty());
        assert!(store.gets().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_skipped_notes_are_not_throttled() {
        let notes: Vec<Note> = (0..3)
            .map(|i| {
                let mut n = dated(&format!("n{}", i), &format!("Note {}", i), "1 Jan 2014 12:00");
                n.tag_guids.push(DONE.to_string());
                n
            })
            .collect();
        let store = RecordingStore::new(notes);
        let start = Instant::now();

        SyncOrchestrator::new(&store, config(249)).unwrap().run().await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
