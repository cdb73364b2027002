use thiserror::Error;

/// Failure of a single store request. Callers never retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{method} {path} could not be sent: {message}")]
    Transport {
        method: &'static str,
        path: String,
        message: String,
    },
    #[error("{method} {path} returned HTTP {status}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("unreadable response from {path}: {message}")]
    Decode { path: String, message: String },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("request rejected: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Input the editors refuse to send to the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingName(&'static str),
    #[error("Please save the project first.")]
    UnsavedProject,
}

/// The initial snapshot could not be fetched; the board renders a placeholder instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not load projects. Is the server running? ({0})")]
pub struct LoadError(#[from] pub StoreError);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no {0} is open")]
    NoDialog(&'static str),
}

impl WorkbenchError {
    pub fn is_validation(&self) -> bool {
        matches!(self, WorkbenchError::Validation(_))
    }
}
