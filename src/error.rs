use thiserror::Error;

use crate::remote::RemoteError;

#[derive(Error, Debug)]
pub enum RedateError {
    #[error("No tag named '{0}' found. Create it in the note store first.")]
    TagNotFound(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Rate limited by the note store for {duration_secs}s")]
    RateLimited { duration_secs: u64 },

    #[error("Note store error: {0}")]
    Remote(String),

    #[error("Malformed date '{text}': {source}")]
    DateParse {
        text: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<RemoteError> for RedateError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::RateLimited { duration_secs } => RedateError::RateLimited { duration_secs },
            RemoteError::NotFound(guid) => RedateError::NoteNotFound(guid),
            RemoteError::Service(message) => RedateError::Remote(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, RedateError>;
