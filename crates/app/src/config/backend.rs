//! Backend Config

use clap::Args;

/// Backend connection settings.
#[derive(Debug, Args)]
pub struct BackendConfig {
    /// Storefront backend base URL; without it the client stays disconnected
    #[arg(long, env = "VITRINE_BACKEND_URL")]
    pub backend_url: Option<String>,
}
