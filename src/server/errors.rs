use std::time::Duration;

use crate::{
    marshal,
    repo::{AggregateError, FacadeError},
    types::ValidationError,
};

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("bad request :: {0}")]
    BadRequest(#[from] marshal::Error),
    #[error("{0}")]
    FacadeError(#[from] FacadeError),
    #[error("update of business `{id}` did not settle within {timeout:?}")]
    Timeout { id: String, timeout: Duration },
}

impl From<ValidationError> for ServerError {
    fn from(value: ValidationError) -> Self {
        Self::BadRequest(value.into())
    }
}

impl ServerError {
    /// Message shown to the caller.
    ///
    /// A failed update reports the first storage error it observed.
    pub fn message(&self) -> String {
        match self {
            Self::FacadeError(FacadeError::AggregateError(AggregateError { source, .. }))
            | Self::FacadeError(FacadeError::PartiallyCreated {
                source: AggregateError { source, .. },
                ..
            }) => source.to_string(),
            e => e.to_string(),
        }
    }

    /// True when the request itself is at fault, not the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::BadRequest(_)
                | Self::FacadeError(FacadeError::BusinessNotFound(_))
                | Self::FacadeError(FacadeError::ValidationError(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{repo, types::Section};

    #[test]
    fn update_failures_report_the_first_error() {
        let err = ServerError::from(FacadeError::from(AggregateError::new(
            Section::Amenities,
            repo::Error::Unavailable("amenity_t is read-only".to_owned()),
        )));

        assert_eq!(err.message(), "storage unavailable :: amenity_t is read-only");
        assert!(!err.is_client_error());
    }

    #[test]
    fn validation_is_a_client_error() {
        let err = ServerError::from(ValidationError::MissingField("name".to_owned()));
        assert!(err.is_client_error());
        assert!(err.message().contains("name"));
    }
}
