//! Admin Config

use clap::Args;

use crate::domain::admin::DEFAULT_ADMIN_PASSWORD;

/// Admin gate settings.
#[derive(Debug, Args)]
pub struct AdminConfig {
    /// Password the admin gate accepts
    #[arg(
        long,
        env = "VITRINE_ADMIN_PASSWORD",
        hide_env_values = true,
        default_value = DEFAULT_ADMIN_PASSWORD
    )]
    pub admin_password: String,
}
