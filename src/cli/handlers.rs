use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::config::SyncConfig;
use crate::error::Result;
use crate::extract::{self, find_date_text};
use crate::remote::FileNoteStore;
use crate::sync::SyncOrchestrator;

pub async fn handle_run(
    store_path: PathBuf,
    config_path: Option<PathBuf>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => SyncConfig::load(&path)?,
        None => SyncConfig::default(),
    };
    config.dry_run |= dry_run;

    let store = FileNoteStore::open(&store_path)?;
    let result = SyncOrchestrator::new(&store, config.clone())?.run().await;

    // Corrections written before a failure are kept.
    if !config.dry_run {
        store.save().await?;
    }
    let summary = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
    }

    Ok(())
}

pub fn handle_extract(file: Option<PathBuf>, stdin: bool, json: bool) -> Result<()> {
    let content = match file {
        Some(path) if !stdin => fs::read_to_string(path)?,
        _ => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            content
        }
    };

    let marker = find_date_text(&content).map(|(marker, _)| marker);
    let date = extract::extract(&content)?;

    if json {
        #[derive(serde::Serialize)]
        struct ExtractJson {
            marker: Option<String>,
            date: Option<chrono::DateTime<chrono::Utc>>,
        }

        let out = ExtractJson {
            marker: marker.map(|m| m.to_string()),
            date,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match (date, marker) {
            (Some(date), Some(marker)) => println!("{} ({})", date.to_rfc3339(), marker),
            _ => println!("No date found"),
        }
    }

    Ok(())
}
