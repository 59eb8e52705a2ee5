pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod invoker;
pub mod model;
pub mod remote;
pub mod sync;

pub use config::SyncConfig;
pub use error::{RedateError, Result};
pub use remote::{FileNoteStore, NoteStore};
pub use sync::{RunSummary, SyncOrchestrator};
