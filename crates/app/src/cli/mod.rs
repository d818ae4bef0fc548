use std::{io::Write, sync::Arc};

use clap::{Parser, Subcommand};
use vitrine_app::{config::ClientConfig, context::Storefront, notify::ConsoleNotifier};

mod admin;
mod cart;
mod render;
mod watches;

#[derive(Debug, Parser)]
#[command(name = "vitrine", about = "Vitrine storefront client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the catalog
    Watches(watches::WatchesCommand),

    /// Inspect and change this client's cart
    Cart(cart::CartCommand),

    /// Manage the catalog (password protected)
    Admin(admin::AdminCommand),
}

impl Cli {
    pub(crate) async fn run(self, out: &mut impl Write) -> Result<(), String> {
        let storefront = Storefront::from_config(&self.config, Arc::new(ConsoleNotifier))
            .map_err(|error| format!("failed to start: {error}"))?;

        match self.command {
            Commands::Watches(command) => watches::run(&storefront, command, out).await,
            Commands::Cart(command) => cart::run(&storefront, command, out).await,
            Commands::Admin(command) => admin::run(&storefront, command, out).await,
        }
    }
}
