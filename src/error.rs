use thiserror::Error;

/// Errors surfaced by the pool core.
///
/// `Configuration` is fatal at startup and never retried. `Validation` is
/// recovered locally: the submission is rejected before any storage call and
/// the message lands in the console pane. `Storage` is fatal for the current
/// operation only.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type PoolResult<T> = Result<T, PoolError>;

impl PoolError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
