use thiserror::Error;

use crate::DocId;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Bad document id, bad token characters, or malformed minus word.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Lookup of a document that is not in the index.
    #[error("document {0} is out of range")]
    OutOfRange(DocId),

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SearchError::InvalidArgument(msg.into())
    }
}
