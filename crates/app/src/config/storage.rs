//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// File name of the client state inside the data directory.
pub const CLIENT_STATE_FILE: &str = "client.json";

/// Local state settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding persistent client state (the user id)
    #[arg(long, env = "VITRINE_DATA_DIR", default_value = ".vitrine")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the persistent client state file.
    #[must_use]
    pub fn client_state_path(&self) -> PathBuf {
        self.data_dir.join(CLIENT_STATE_FILE)
    }
}
