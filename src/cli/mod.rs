mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{handle_extract, handle_run};
