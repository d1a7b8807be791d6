use crate::types::{BusinessId, Section, ValidationError};

#[derive(thiserror::Error, Debug)]
pub enum FacadeError {
    #[error("business `{0}` not found")]
    BusinessNotFound(BusinessId),
    #[error("validation error :: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("repository error :: {0}")]
    RepositoryError(#[from] crate::repo::Error),
    #[error("{0}")]
    AggregateError(#[from] AggregateError),
    #[error("business `{id}` created, but {source}")]
    PartiallyCreated {
        id: BusinessId,
        source: AggregateError,
    },
    #[error("concurrency error :: {0}")]
    ConcurrencyError(String),
}

/// The first storage error observed while fanning out an update, tagged with
/// the section that produced it.
#[derive(thiserror::Error, Debug)]
#[error("`{section}` update failed :: {source}")]
pub struct AggregateError {
    pub section: Section,
    pub source: crate::repo::Error,
}

impl AggregateError {
    pub fn new(section: Section, source: crate::repo::Error) -> Self {
        Self { section, source }
    }
}
