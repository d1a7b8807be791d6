//! JSON marshalling of the action boundary.
//!
//! Payloads are decoded into plain serde structs first, then converted into
//! validated domain requests. Nothing in here touches storage.

mod actions;
pub use actions::*;

mod payloads;
pub use payloads::*;

mod filter;
pub use filter::*;

use crate::{query, types::ValidationError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("malformed payload :: {0}")]
    Deserialization(#[from] serde_json::Error),
    #[error("validation error :: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("bad filter :: {0}")]
    FilterError(#[from] query::Error),
}
