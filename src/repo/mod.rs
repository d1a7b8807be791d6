//! # Repository Module
//!
//! Persistence of the business aggregate: one root table and five child
//! tables linked only by a `business_id` column. The storage offers no
//! transaction spanning more than one call, so every primitive exposed by a
//! [`RecordStore`] succeeds or fails on its own. Keeping the aggregate
//! consistent is the job of the [`facades`] layer.

mod error;
pub use error::*;

mod record_store;
pub use record_store::*;

mod memory;
pub use memory::*;

mod pg_store;
pub use pg_store::*;

mod sql_models;
pub use sql_models::*;

pub mod facades;
pub use facades::*;

#[cfg(test)]
pub mod testing;
