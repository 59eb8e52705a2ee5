use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RedateError, Result};
use crate::extract::DATE_LABEL;
use crate::remote::USER_NOTES_MAX;

/// Settings for a correction pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Name of the tag marking notes that are already corrected.
    pub tag_name: String,
    /// Catalog filter: only notes whose content contains this text are listed.
    pub filter_words: String,
    /// Summaries requested per catalog page.
    pub page_size: usize,
    /// Pause after each fetched note, in seconds.
    pub pause_secs: u64,
    /// Longer pause taken instead on every `long_pause_every`-th note.
    pub long_pause_secs: u64,
    pub long_pause_every: usize,
    /// Added on top of the cooldown the service asks for.
    pub cooldown_margin_secs: u64,
    /// Report what would change without writing anything.
    pub dry_run: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tag_name: "done".to_string(),
            filter_words: DATE_LABEL.to_string(),
            page_size: USER_NOTES_MAX - 1,
            pause_secs: 1,
            long_pause_secs: 5,
            long_pause_every: 10,
            cooldown_margin_secs: 10,
            dry_run: false,
        }
    }
}

impl SyncConfig {
    /// Load from a YAML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: SyncConfig = serde_yaml::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tag_name.trim().is_empty() {
            return Err(RedateError::Config("tag_name must not be empty".to_string()));
        }
        if self.page_size == 0 || self.page_size > USER_NOTES_MAX {
            return Err(RedateError::Config(format!(
                "page_size must be between 1 and {}, got {}",
                USER_NOTES_MAX, self.page_size
            )));
        }
        if self.long_pause_every == 0 {
            return Err(RedateError::Config("long_pause_every must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Pause owed after the `count`-th fetched note (1-based).
    pub fn pause_after(&self, count: usize) -> Duration {
        if count % self.long_pause_every == 0 {
            Duration::from_secs(self.long_pause_secs)
        } else {
            Duration::from_secs(self.pause_secs)
        }
    }

    pub fn cooldown_margin(&self) -> Duration {
        Duration::from_secs(self.cooldown_margin_secs)
    }
}
