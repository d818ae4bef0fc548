//! Vitrine storefront CLI

use std::{io, process};

use clap::Parser;
use tracing::error;
use vitrine_app::observability;

use crate::cli::Cli;

mod cli;

#[tokio::main]
pub async fn main() {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }

    let mut stdout = io::stdout().lock();

    if let Err(message) = cli.run(&mut stdout).await {
        error!("{message}");

        #[expect(
            clippy::print_stderr,
            reason = "command errors are user-facing output"
        )]
        {
            eprintln!("error: {message}");
        }

        process::exit(1);
    }
}
