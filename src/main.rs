//! Sparkify Lake CLI
//!
//! Runs the ETL job from the command line

use clap::Parser;
use sparkify_lake::cli::{Cli, Runner};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let runner = Runner::new(cli);
    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        if e.is_input_error() {
            eprintln!("Check --input and the song_data/log_data prefixes in the config");
        }
        std::process::exit(1);
    }
}
