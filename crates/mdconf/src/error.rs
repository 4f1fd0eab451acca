//! CLI error types.

use mdconf_config::ConfigError;
use mdconf_confluence::ConfluenceError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Confluence(#[from] ConfluenceError),

    #[error("{0}")]
    Validation(String),

    #[error("{0} document(s) failed to sync")]
    SyncFailed(usize),
}
