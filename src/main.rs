mod archive;
mod bundle;
mod cli;
mod commands;
mod config;
mod env;
mod error;
mod fetch;
mod host;
mod http;
mod node;
mod output;
mod prompt;
mod registry;
mod remove;
mod resolve;
mod scanner;
mod vcs;
mod walker;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// stderr にログを出す（`RUST_LOG`、`--verbose` で debug）
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("srcpm=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = commands::dispatch(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
