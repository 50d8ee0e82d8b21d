use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid reporter name: {0}")]
    UnknownReporter(String),
    #[error("invalid scope: {0}")]
    UnknownScope(String),
    #[error("unknown check id: {0}")]
    UnknownCheck(String),
    #[error("git operation failed: {0}")]
    Git(String),
    #[error("{0} timed out after {1:?}")]
    Timeout(String, std::time::Duration),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        Error::Git(err.to_string())
    }
}
