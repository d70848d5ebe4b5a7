use thiserror::Error;

/// Main error type for InstaDB
#[derive(Error, Debug)]
pub enum InstaError {
    /// Docker API errors
    #[error("Docker error: {0}")]
    Docker(#[from] DockerError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Docker-specific errors
#[derive(Error, Debug)]
pub enum DockerError {
    /// Connection errors
    #[error("Failed to connect to Docker: {0}")]
    Connection(String),

    /// Resource not found
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Operation timeout
    #[error("Operation '{operation}' timed out after {duration}s")]
    Timeout { operation: String, duration: u64 },

    /// Container errors
    #[error("Container error: {0}")]
    Container(String),

    /// Image errors
    #[error("Image error: {0}")]
    Image(String),

    /// Free port search exhausted
    #[error("No free port found after {attempts} attempts")]
    NoFreePort { attempts: u32 },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Validation errors
    #[error("{0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, InstaError>;
