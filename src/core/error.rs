//! Launcher error taxonomy

use std::path::PathBuf;

/// Fatal launcher errors. Every variant aborts the run with a non-zero
/// exit; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Install location or JVM directory could not be determined
    #[error("Failed to resolve {what}: {reason}")]
    Resolution { what: &'static str, reason: String },

    /// A config file with no usable default is absent or unreadable
    #[error("Missing required config file {}: {source}", .path.display())]
    ConfigMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Seeded defaults could not be written back
    #[error("Failed to write config file {}: {source}", .path.display())]
    ConfigPersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Child process creation failed
    #[error("Failed to start '{binary}': {source}")]
    ChildStart {
        binary: String,
        #[source]
        source: std::io::Error,
    },
}
