use clap::Parser;
use redate::cli::{handle_extract, handle_run, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("redate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            store,
            config,
            dry_run,
            json,
        } => handle_run(store, config, dry_run, json).await,
        Commands::Extract { file, stdin, json } => handle_extract(file, stdin, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
