use thiserror::Error;

/// Core error type shared across keyaudit crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The run cannot start.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Database error or inspector failure.
    #[error("database error: {0}")]
    Db(String),
    /// A requested feature is not supported by the engine.
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results returned by keyaudit crates.
pub type Result<T> = std::result::Result<T, Error>;
