/// Shared error type used across all session-authority crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed caller input, e.g. an empty user identifier.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store could not serve the request.
    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the caller should treat this as a store outage (fail closed)
    /// rather than a bad request.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
