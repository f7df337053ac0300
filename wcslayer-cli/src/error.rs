//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the terminal with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to initialize logging: {0}")]
    Logging(#[from] std::io::Error),

    #[error("coverage acquisition failed; see the log for details")]
    Fetch,

    #[error("failed to inspect cache directory '{path}': {source}")]
    CacheInspect {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to clear cache directory '{path}': {source}")]
    CacheClear {
        path: String,
        source: std::io::Error,
    },
}
