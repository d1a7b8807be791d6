use super::ChildKind;

/// Failure of a single storage call.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unable to find {0}")]
    NotFound(String),
    #[error("backend error :: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("migration error :: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("storage unavailable :: {0}")]
    Unavailable(String),
    #[error("expected `{expected}` rows, found `{found}` rows")]
    KindMismatch { expected: ChildKind, found: ChildKind },
    #[error("corrupted row in {table}: {msg}")]
    Corrupted { table: &'static str, msg: String },
}
