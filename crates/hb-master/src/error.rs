//! Error types for host operations.

use std::path::PathBuf;

use hb_ir::GraphError;
use thiserror::Error;

/// Errors that can occur while configuring or driving a host.
#[derive(Debug, Error)]
pub enum HostError {
    /// Failed to read a configuration file
    #[error("failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// Bank graph or resolution failure
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl HostError {
    pub fn read_config(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HostError::ReadConfig { path: path.into(), source }
    }
}
