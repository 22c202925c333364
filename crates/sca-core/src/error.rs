use thiserror::Error;

pub type ScaResult<T> = Result<T, ScaError>;

#[derive(Debug, Error)]
pub enum ScaError {
    /// Empty or absent password; no job is started.
    #[error("Please type in a password.")]
    InvalidKeyInput,

    #[error("Something went wrong with selecting your file: {0}")]
    FileSelection(String),

    #[error("path error: {0}")]
    Path(String),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("a job is already running")]
    Busy,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
