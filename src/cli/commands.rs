use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "redate")]
#[command(version, about = "Restore the original creation dates of imported notes")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a correction pass over a note store
    Run {
        /// JSON export of the note store (tags and notes)
        #[arg(long, value_name = "FILE")]
        store: PathBuf,

        /// YAML configuration file
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Output the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the date embedded in a single note body
    Extract {
        /// File holding the note content
        #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
        file: Option<PathBuf>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
