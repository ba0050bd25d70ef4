use thiserror::Error;

/// Database related errors
#[derive(Debug, Error)]
pub enum Error {
    /// The configured Postgres connection URL does not parse.
    #[error("invalid connection url")]
    InvalidUrl,
    /// An error bubbled up from [`sqlx`].
    #[error("received a pool error: {0}")]
    Internal(sqlx::Error),
    /// Schema migrations could not be applied.
    #[error("failed to run database migrations")]
    Migrate,
    /// The pool has no reliable connection to the database.
    #[error("unhealthy database pool")]
    UnhealthyPool,
}

pub type Result<T> = error_stack::Result<T, Error>;

/// Checks on `error_stack::Report<Error>` without downcasting at
/// every call site.
pub trait ErrorExt {
    fn is_unhealthy(&self) -> bool;
}

impl ErrorExt for error_stack::Report<Error> {
    fn is_unhealthy(&self) -> bool {
        self.downcast_ref::<Error>()
            .map(|v| matches!(v, Error::UnhealthyPool))
            .unwrap_or_default()
    }
}
