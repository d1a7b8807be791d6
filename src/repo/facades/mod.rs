//! # Facade Module
//!
//! Logic layer between the action handlers and a [`super::RecordStore`].
//!
//! A business is an aggregate spread over a root relation and five child
//! relations, and the store only offers primitives on one relation at a time.
//! The facades rebuild the aggregate on top of those primitives:
//!
//! * [`FacadeGather`] joins roots with their children using one batched read
//!   per child relation.
//! * [`FacadeFanOut`] splits an update into independent units, issues them
//!   concurrently and settles the caller exactly once.
//! * [`FacadeCatalog`] validates requests and composes the two.

mod facade_error;
pub use facade_error::*;

mod facade_gather;
pub use facade_gather::*;

mod facade_fanout;
pub use facade_fanout::*;

mod facade_catalog;
pub use facade_catalog::*;
