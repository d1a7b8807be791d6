//! Action handlers.
//!
//! Each handler turns a decoded payload into a validated request, runs it
//! against the catalog and wraps the result in an [`crate::marshal::ActionResponse`].

mod business;

pub use business::BusinessActionHandler;

use std::{sync::Arc, time::Duration};

use crate::{params, repo};

/// Shared context for all action handlers.
pub struct ActionContext {
    pub catalog: Arc<repo::FacadeCatalog>,
    /// Upper bound on how long an update is awaited, see [`params::Configurables`]
    pub update_timeout: Option<Duration>,
}

impl ActionContext {
    pub fn new(store: repo::RecordStoreRef) -> Self {
        Self {
            catalog: Arc::new(repo::FacadeCatalog::new(store)),
            update_timeout: params::configurables().update_timeout,
        }
    }

    pub fn with_update_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.update_timeout = timeout;
        self
    }
}
