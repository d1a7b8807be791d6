//! # In-memory Filtering
//!
//! Filters are evaluated on joined [`crate::types::BusinessView`]s after the
//! scatter-gather read. They are never pushed into storage, since the
//! children they look at live in separate relations.

mod filter;
pub use filter::*;

mod text;
pub use text::*;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed filter :: {0}")]
    Malformed(String),
    #[error("bad field `{field}`")]
    BadField { field: String },
    #[error("unsupported operation on field `{field}`")]
    UnsupportedOp { field: String },
    #[error("operation error :: {0}")]
    OpError(#[from] OpError),
}
