use thiserror::Error;

use importer_api::LookupError;

#[derive(Debug, Error)]
pub enum ImporterError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("entry {0} not found")]
    EntryNotFound(i64),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
