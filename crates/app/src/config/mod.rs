//! Client configuration module

use clap::Args;

use crate::config::{
    admin::AdminConfig, backend::BackendConfig, observability::LoggingConfig,
    storage::StorageConfig,
};

pub mod admin;
pub mod backend;
pub mod observability;
pub mod storage;

pub use observability::LogFormat;

/// Vitrine client configuration
#[derive(Debug, Args)]
pub struct ClientConfig {
    /// Backend connection settings.
    #[command(flatten)]
    pub backend: BackendConfig,

    /// Local state settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Admin gate settings.
    #[command(flatten)]
    pub admin: AdminConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
