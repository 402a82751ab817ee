//! Error types for vigil-core
//!
//! Session operations themselves never fail: malformed persisted state,
//! lapsed cookies, and dropped writes are all absorbed into "no session"
//! by contract. Errors exist only at the edges — configuration loading and
//! logging initialization.

use thiserror::Error;

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging initialization errors
    #[error("logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// IO errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A sampling rate is outside `[0,1]`
    #[error("{name} must be a probability in [0,1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
}
