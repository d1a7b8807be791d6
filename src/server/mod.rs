//! Action boundary of the catalog service.
//!
//! Requests arrive as an action name plus a JSON body, are decoded by
//! [`crate::marshal`] and dispatched by [`endpoints::do_action`].

pub mod endpoints;
pub mod errors;
