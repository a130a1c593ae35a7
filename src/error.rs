use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a bench config or turning it into a request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read bench config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse bench config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown service resolution mode: {0:?}")]
    UnknownResolutionMode(String),

    #[error("invalid http method: {0:?}")]
    InvalidMethod(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl ConfigError {
    /// True when the config file could not be read.
    pub fn is_io(&self) -> bool {
        matches!(self, ConfigError::Io { .. })
    }

    /// True when the config file was read but is not a valid bench config.
    pub fn is_parse(&self) -> bool {
        matches!(self, ConfigError::Parse { .. })
    }
}
