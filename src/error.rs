use thiserror::Error;

#[derive(Debug, Error)]
pub enum EaseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("no usable primary key: {0}")]
    NoPrimaryKey(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("cannot open database: {0}")]
    Open(String),
}

impl From<rusqlite::Error> for EaseError {
    fn from(err: rusqlite::Error) -> Self {
        // Engine messages pass through verbatim; SQL failures are not
        // transient, so the caller sees exactly what SQLite reported.
        EaseError::Query(err.to_string())
    }
}
